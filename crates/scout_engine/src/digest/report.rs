use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use scout_core::{BatchReport, ItemStatus};

use super::{aggregate, Digest, DigestEntry, DigestOptions, FeedEntry, SourceResult};
use crate::linkedin::CompanyJobs;

/// Markdown for the AI updates digest.
pub fn render_ai_digest(digest: &Digest, hours: u32, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# AI digest: last {hours} h (until {} UTC)\n",
        generated_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out, "Total items: {}", digest.item_count());
    for (source, entries) in &digest.groups {
        let _ = writeln!(out, "\n## {source}\n");
        if entries.is_empty() {
            let _ = writeln!(out, "_No new items._");
        }
        for entry in entries {
            write_entry(&mut out, entry);
        }
    }
    out
}

fn write_entry(out: &mut String, entry: &DigestEntry) {
    if entry.is_error {
        let _ = writeln!(out, "- {}: {} ({})", entry.title, entry.summary, entry.link);
        return;
    }
    let date = entry
        .published_at
        .map(|at| format!(" ({})", at.format("%Y-%m-%d")))
        .unwrap_or_default();
    let _ = writeln!(out, "- **[{}]({})**{date}", entry.title, entry.link);
    if !entry.summary.is_empty() {
        let _ = writeln!(out, "  {}", entry.summary);
    }
}

/// Job listings of a batch of companies, grouped for the jobs report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobsDigest {
    pub companies_processed: usize,
    pub digest: Digest,
    pub without_jobs: Vec<String>,
    /// `(company, message)` for companies whose page could not be read.
    pub errored: Vec<(String, String)>,
}

impl JobsDigest {
    pub fn from_report(report: &BatchReport, per_company_limit: usize) -> Self {
        let mut sources: BTreeMap<String, SourceResult> = BTreeMap::new();
        let mut without_jobs = Vec::new();
        let mut errored = Vec::new();

        for item in &report.results {
            let company = item
                .detail
                .as_ref()
                .and_then(|detail| serde_json::from_value::<CompanyJobs>(detail.clone()).ok());
            match (item.status, company) {
                (ItemStatus::Succeeded, Some(company)) if !company.jobs.is_empty() => {
                    let entries = company.jobs.into_iter().map(|job| FeedEntry {
                        title: job.title,
                        link: job.url,
                        published: None,
                        summary: job.location,
                    });
                    if let Ok(list) = sources.entry(company.company_name).or_insert_with(|| Ok(Vec::new())) {
                        list.extend(entries);
                    }
                }
                (ItemStatus::Succeeded | ItemStatus::AlreadySatisfied, company) => {
                    let name = company
                        .map(|c| c.company_name)
                        .unwrap_or_else(|| scout_core::urls::company_display_name(&item.target));
                    without_jobs.push(name);
                }
                _ => errored.push((
                    scout_core::urls::company_display_name(&item.target),
                    item.message.clone().unwrap_or_default(),
                )),
            }
        }

        let options = DigestOptions {
            per_source_limit: per_company_limit,
            per_source_cap: per_company_limit,
            ..DigestOptions::default()
        };
        Self {
            companies_processed: report.results.len(),
            digest: aggregate(&sources, &options),
            without_jobs,
            errored,
        }
    }

    pub fn total_jobs(&self) -> usize {
        self.digest.item_count()
    }
}

/// Markdown for the jobs digest.
pub fn render_jobs_digest(jobs: &JobsDigest, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# LinkedIn jobs digest: {}\n",
        generated_at.format("%Y-%m-%d")
    );
    let _ = writeln!(out, "- **Companies processed:** {}", jobs.companies_processed);
    let _ = writeln!(out, "- **Companies with jobs:** {}", jobs.digest.groups.len());
    let _ = writeln!(out, "- **Total jobs:** {}", jobs.total_jobs());

    if !jobs.digest.groups.is_empty() {
        let _ = writeln!(out, "\n## Companies with jobs");
        for (company, entries) in &jobs.digest.groups {
            let _ = writeln!(out, "\n### {company} ({})\n", entries.len());
            for entry in entries {
                let location = if entry.summary.is_empty() {
                    String::new()
                } else {
                    format!(", {}", entry.summary)
                };
                if entry.link.is_empty() {
                    let _ = writeln!(out, "- {}{location}", entry.title);
                } else {
                    let _ = writeln!(out, "- [{}]({}){location}", entry.title, entry.link);
                }
            }
        }
    }
    if !jobs.without_jobs.is_empty() {
        let _ = writeln!(out, "\n## Companies without jobs\n");
        for company in &jobs.without_jobs {
            let _ = writeln!(out, "- {company}");
        }
    }
    if !jobs.errored.is_empty() {
        let _ = writeln!(out, "\n## Errors\n");
        for (company, message) in &jobs.errored {
            let _ = writeln!(out, "- {company}: {message}");
        }
    }
    out
}
