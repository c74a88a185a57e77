//! Company lists: URLs pulled out of exported text and the follow ledger.
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scout_core::urls::normalize_company_url;
use scout_core::{BatchReport, BatchSummary, ItemStatus, WorkItem};

static COMPANY_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://(?:[a-z]{2,3}\.)?linkedin\.com/company/[^\s,;"'<>()\[\]]+"#)
        .expect("valid company url pattern")
});

/// Normalized company URLs in order of first appearance, without duplicates.
pub fn company_urls_from_text(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    COMPANY_URL
        .find_iter(text)
        .filter_map(|m| normalize_company_url(m.as_str()))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Drops every URL that normalizes to one in `excluded`.
pub fn exclude(urls: Vec<String>, excluded: &[String]) -> Vec<String> {
    let excluded: HashSet<String> = excluded
        .iter()
        .filter_map(|url| normalize_company_url(url))
        .collect();
    urls.into_iter().filter(|url| !excluded.contains(url)).collect()
}

/// Companies a follow ledger reports as followed, either by this run or
/// before it.
pub fn followed_companies(ledger: &BatchReport) -> Vec<String> {
    let mut seen = HashSet::new();
    ledger
        .results
        .iter()
        .filter(|item| matches!(item.status, ItemStatus::Succeeded | ItemStatus::AlreadySatisfied))
        .filter_map(|item| normalize_company_url(&item.target))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Folds the latest follow run into the prior ledger. A company attempted
/// again keeps only its latest result; everything else from the prior ledger
/// is carried over ahead of the new results.
pub fn merge_ledger(prior: BatchReport, latest: &BatchReport) -> BatchReport {
    let ledger_key = |item: &WorkItem| normalize_company_url(&item.target).unwrap_or_else(|| item.target.clone());
    let attempted: HashSet<String> = latest.results.iter().map(ledger_key).collect();
    let results: Vec<WorkItem> = prior
        .results
        .into_iter()
        .filter(|item| !attempted.contains(&ledger_key(item)))
        .chain(latest.results.iter().cloned())
        .enumerate()
        .map(|(index, item)| WorkItem { index, ..item })
        .collect();
    BatchReport {
        summary: BatchSummary::from_results(results.len(), &results),
        interrupted: latest.interrupted,
        results,
    }
}
