use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::page::normalize_text;
use crate::text::{plain_summary, MAX_SUMMARY_CHARS};

/// One item as delivered by a source (a feed entry or a job listing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    /// Raw summary; may contain markup.
    pub summary: String,
}

/// Why a source produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub url: String,
    pub message: String,
}

pub type SourceResult = Result<Vec<FeedEntry>, SourceFailure>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestEntry {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    /// Plain text, truncated on a word boundary.
    pub summary: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestOptions {
    /// Entries published before this are dropped; undated entries are kept.
    pub since: Option<DateTime<Utc>>,
    /// Most entries shown per source.
    pub per_source_limit: usize,
    /// Most recent entries considered per source, before the time filter.
    pub per_source_cap: usize,
    pub summary_max_chars: usize,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            since: None,
            per_source_limit: 20,
            per_source_cap: 30,
            summary_max_chars: MAX_SUMMARY_CHARS,
        }
    }
}

/// Entries grouped by source name, sources in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub since: Option<DateTime<Utc>>,
    pub groups: BTreeMap<String, Vec<DigestEntry>>,
}

impl Digest {
    /// Real entries across all sources, synthetic error entries excluded.
    pub fn item_count(&self) -> usize {
        self.groups.values().flatten().filter(|e| !e.is_error).count()
    }

    pub fn failed_sources(&self) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|(_, entries)| entries.iter().any(|e| e.is_error))
            .map(|(source, _)| source.as_str())
            .collect()
    }

    pub fn entries(&self, source: &str) -> &[DigestEntry] {
        self.groups.get(source).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Merges per-source results into a digest.
///
/// Per source: newest first (undated last, ties keep input order), capped to
/// `per_source_cap`, filtered by `since`, deduplicated by `(title, link)`,
/// limited to `per_source_limit`. A failed source becomes one error entry.
/// The result depends only on the inputs, so aggregating twice is identical.
pub fn aggregate(results: &BTreeMap<String, SourceResult>, options: &DigestOptions) -> Digest {
    let groups = results
        .iter()
        .map(|(source, result)| {
            let entries = match result {
                Ok(entries) => source_entries(source, entries, options),
                Err(failure) => vec![error_entry(source, failure)],
            };
            (source.clone(), entries)
        })
        .collect();
    Digest {
        since: options.since,
        groups,
    }
}

fn source_entries(source: &str, entries: &[FeedEntry], options: &DigestOptions) -> Vec<DigestEntry> {
    let mut working: Vec<&FeedEntry> = entries.iter().collect();
    // Option orders None first, so descending puts undated entries last.
    working.sort_by(|a, b| b.published.cmp(&a.published));
    working.truncate(options.per_source_cap);

    let mut seen = HashSet::new();
    working
        .into_iter()
        .filter(|entry| match (options.since, entry.published) {
            (Some(since), Some(published)) => published >= since,
            _ => true,
        })
        .map(|entry| (normalize_text(&entry.title), entry.link.trim(), entry))
        .filter(|(title, link, _)| seen.insert((title.clone(), *link)))
        .take(options.per_source_limit)
        .map(|(title, link, entry)| DigestEntry {
            title,
            link: link.to_string(),
            published_at: entry.published,
            source: source.to_string(),
            summary: plain_summary(&entry.summary, options.summary_max_chars),
            is_error: false,
        })
        .collect()
}

fn error_entry(source: &str, failure: &SourceFailure) -> DigestEntry {
    DigestEntry {
        title: format!("Error fetching {source}"),
        link: failure.url.clone(),
        published_at: None,
        source: source.to_string(),
        summary: failure.message.clone(),
        is_error: true,
    }
}
