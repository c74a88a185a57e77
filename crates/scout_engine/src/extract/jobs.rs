use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scout_core::urls::{resolve_link, LINKEDIN_ORIGIN};
use scout_core::{Cascade, ExtractionResult, StrategyError};
use scraper::ElementRef;

use super::JobListing;
use crate::page::{element_text, normalize_text, select_within, DomSnapshot};

pub const MAX_JOBS_PER_STRATEGY: usize = 30;
pub const MAX_RAW_JOB_IDS: usize = 20;
const MIN_TITLE_CHARS: usize = 4;
const MAX_PARENT_TITLE_CHARS: usize = 100;

const JOB_CARDS: &str = "div[class*=\"job-card\"], li[class*=\"job\"], div[data-test-id*=\"job\"]";
const CARD_TITLE: &str = "h3, h4, a[href*=\"/jobs/view/\"], span[class*=\"title\"]";
const JOB_LINK: &str = "a[href*=\"/jobs/view/\"]";
const CARD_LOCATIONS: &[&str] = &[
    "span[class*=\"location\"]",
    "span[class*=\"job-location\"]",
    "div[class*=\"location\"]",
];

static JOB_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/jobs/view/(\d+)").expect("valid job id pattern"));

/// Job listings on a company jobs page: card containers, then bare job links,
/// then job ids scraped from the raw HTML.
pub fn job_list_cascade() -> Cascade<DomSnapshot, Vec<JobListing>> {
    Cascade::new("job listings", |jobs: &Vec<JobListing>| !jobs.is_empty())
        .strategy("job cards", |snap: &DomSnapshot| job_cards(snap).map(non_empty))
        .strategy("job links", |snap: &DomSnapshot| job_links(snap).map(non_empty))
        .strategy("raw job ids", |snap: &DomSnapshot| Ok(non_empty(raw_job_ids(snap.html()))))
}

pub fn extract_job_listings(url: &str, html: &str) -> ExtractionResult<Vec<JobListing>> {
    let snapshot = DomSnapshot::parse(url, html);
    job_list_cascade().extract(&snapshot)
}

/// Keeps the first listing of every title, comparing titles case- and
/// whitespace-insensitively.
pub fn dedupe_by_title(jobs: Vec<JobListing>) -> Vec<JobListing> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| seen.insert(normalize_text(&job.title).to_lowercase()))
        .collect()
}

fn non_empty(jobs: Vec<JobListing>) -> Option<Vec<JobListing>> {
    let jobs = dedupe_by_title(jobs);
    (!jobs.is_empty()).then_some(jobs)
}

fn is_valid_title(title: &str) -> bool {
    title.chars().count() >= MIN_TITLE_CHARS
}

fn absolute(href: &str) -> Option<String> {
    resolve_link(href, LINKEDIN_ORIGIN)
}

fn job_cards(snap: &DomSnapshot) -> Result<Vec<JobListing>, StrategyError> {
    let mut jobs = Vec::new();
    for card in snap.select(JOB_CARDS)?.into_iter().take(MAX_JOBS_PER_STRATEGY) {
        let Some(title_el) = select_within(card, CARD_TITLE)?.into_iter().next() else {
            continue;
        };
        let title = element_text(title_el);
        if !is_valid_title(&title) {
            continue;
        }
        let url = select_within(card, JOB_LINK)?
            .into_iter()
            .find_map(|link| link.value().attr("href").and_then(absolute))
            .unwrap_or_default();
        jobs.push(JobListing {
            title,
            url,
            location: card_location(card)?,
        });
    }
    Ok(jobs)
}

fn card_location(card: ElementRef<'_>) -> Result<String, StrategyError> {
    for css in CARD_LOCATIONS {
        if let Some(el) = select_within(card, css)?.into_iter().next() {
            return Ok(element_text(el));
        }
    }
    Ok(String::new())
}

fn job_links(snap: &DomSnapshot) -> Result<Vec<JobListing>, StrategyError> {
    let mut jobs = Vec::new();
    for link in snap.select(JOB_LINK)?.into_iter().take(MAX_JOBS_PER_STRATEGY) {
        let Some(url) = link.value().attr("href").and_then(absolute) else {
            continue;
        };
        let mut title = element_text(link);
        if title.is_empty() {
            title = link
                .parent()
                .and_then(ElementRef::wrap)
                .map(|parent| {
                    element_text(parent)
                        .chars()
                        .take(MAX_PARENT_TITLE_CHARS)
                        .collect::<String>()
                })
                .unwrap_or_default();
        }
        if is_valid_title(&title) {
            jobs.push(JobListing {
                title,
                url,
                location: String::new(),
            });
        }
    }
    Ok(jobs)
}

/// Last resort for pages whose markup hides the listings: any `/jobs/view/<id>`
/// reference in the source becomes a listing.
fn raw_job_ids(html: &str) -> Vec<JobListing> {
    let mut seen = HashSet::new();
    JOB_ID
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|id| seen.insert(*id))
        .take(MAX_RAW_JOB_IDS)
        .map(|id| JobListing {
            title: anchor_text_for(html, id).unwrap_or_else(|| format!("Job {id}")),
            url: format!("{LINKEDIN_ORIGIN}/jobs/view/{id}/"),
            location: String::new(),
        })
        .collect()
}

fn anchor_text_for(html: &str, id: &str) -> Option<String> {
    let pattern = Regex::new(&format!(r"jobs/view/{id}[^>]*>([^<]+)")).ok()?;
    let text = pattern
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| normalize_text(m.as_str()))
        .find(|text| !text.is_empty());
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ids_are_unique_and_capped() {
        let html: String = (0..50)
            .map(|i| format!("<a href=\"/jobs/view/{}/\">Role number {i}</a>", 1000 + i % 25))
            .collect();
        let jobs = raw_job_ids(&html);
        assert_eq!(jobs.len(), MAX_RAW_JOB_IDS);
        assert_eq!(jobs[0].url, "https://www.linkedin.com/jobs/view/1000/");
        assert_eq!(jobs[0].title, "Role number 0");
    }

    #[test]
    fn raw_id_without_anchor_text_gets_placeholder_title() {
        let jobs = raw_job_ids(r#"{"url":"/jobs/view/77"}"#);
        assert_eq!(jobs[0].title, "Job 77");
    }

    #[test]
    fn anchor_text_skips_blank_anchors() {
        let html = r#"<a href="/jobs/view/9/"> </a><a href="/jobs/view/9/?trk=x">
            Senior   Engineer </a>"#;
        assert_eq!(anchor_text_for(html, "9").as_deref(), Some("Senior Engineer"));
        assert_eq!(anchor_text_for(html, "10"), None);
    }

    #[test]
    fn dedupe_normalizes_titles() {
        let job = |title: &str| JobListing {
            title: title.to_string(),
            url: String::new(),
            location: String::new(),
        };
        let jobs = dedupe_by_title(vec![job("Game Designer"), job("game   designer"), job("Artist")]);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Game Designer");
    }
}
