use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use scout_core::{BatchReport, BatchSummary, ItemStatus, WorkItem};
use scout_engine::digest::{
    aggregate, render_ai_digest, render_jobs_digest, DigestOptions, FeedEntry, JobsDigest, SourceFailure,
    SourceResult,
};
use serde_json::json;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

fn entry(title: &str, published: Option<DateTime<Utc>>) -> FeedEntry {
    FeedEntry {
        title: title.to_string(),
        link: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
        published,
        summary: format!("<p>About <b>{title}</b></p>"),
    }
}

fn last_day() -> DigestOptions {
    DigestOptions {
        since: Some(now() - Duration::hours(24)),
        ..DigestOptions::default()
    }
}

fn single(source: &str, result: SourceResult) -> BTreeMap<String, SourceResult> {
    BTreeMap::from([(source.to_string(), result)])
}

#[test]
fn window_keeps_recent_and_undated_entries() {
    let results = single(
        "OpenAI",
        Ok(vec![
            entry("Undated", None),
            entry("Old", Some(now() - Duration::hours(30))),
            entry("Fresh", Some(now() - Duration::hours(1))),
        ]),
    );

    let digest = aggregate(&results, &last_day());

    let titles: Vec<&str> = digest.entries("OpenAI").iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Fresh", "Undated"]);
    assert_eq!(digest.entries("OpenAI")[0].summary, "About Fresh");
    assert_eq!(digest.item_count(), 2);
}

#[test]
fn entries_are_newest_first_and_unique() {
    let at = |h: i64| Some(now() - Duration::hours(h));
    let results = single(
        "Google Cloud",
        Ok(vec![
            entry("B", at(5)),
            entry("A", at(2)),
            entry("B", at(5)),
            entry("C", at(9)),
        ]),
    );

    let digest = aggregate(&results, &last_day());
    let entries = digest.entries("Google Cloud");

    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
    assert!(entries
        .windows(2)
        .all(|pair| pair[0].published_at >= pair[1].published_at));
}

#[test]
fn titles_differing_only_in_whitespace_are_one_entry() {
    let published = Some(now() - Duration::hours(1));
    let item = |title: &str| FeedEntry {
        title: title.to_string(),
        link: "https://x/a".to_string(),
        published,
        summary: String::new(),
    };
    let results = single("Google AI", Ok(vec![item("Gemini 3"), item("\n  Gemini 3\n")]));

    let digest = aggregate(&results, &last_day());

    let entries = digest.entries("Google AI");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Gemini 3");
}

#[test]
fn cap_is_applied_before_the_time_filter() {
    let mut entries: Vec<FeedEntry> = (0..5)
        .map(|i| entry(&format!("Recent {i}"), Some(now() - Duration::minutes(i))))
        .collect();
    entries.push(entry("Still in window", Some(now() - Duration::hours(2))));
    let options = DigestOptions {
        per_source_cap: 5,
        ..last_day()
    };

    let digest = aggregate(&single("xAI", Ok(entries)), &options);

    assert_eq!(digest.entries("xAI").len(), 5);
    assert!(digest.entries("xAI").iter().all(|e| e.title.starts_with("Recent")));
}

#[test]
fn per_source_limit_bounds_the_output() {
    let entries: Vec<FeedEntry> = (0..10)
        .map(|i| entry(&format!("Post {i}"), Some(now() - Duration::minutes(i))))
        .collect();
    let options = DigestOptions {
        per_source_limit: 3,
        ..last_day()
    };
    let digest = aggregate(&single("Gemini", Ok(entries)), &options);
    assert_eq!(digest.entries("Gemini").len(), 3);
}

#[test]
fn failed_source_becomes_an_error_entry() {
    let mut results = single("OpenAI", Ok(vec![entry("Fresh", Some(now()))]));
    results.insert(
        "Manus".to_string(),
        Err(SourceFailure {
            url: "https://manus.im/feed".to_string(),
            message: "HttpStatus: HTTP 500".to_string(),
        }),
    );

    let digest = aggregate(&results, &last_day());

    let error = &digest.entries("Manus")[0];
    assert!(error.is_error);
    assert_eq!(error.title, "Error fetching Manus");
    assert_eq!(digest.failed_sources(), vec!["Manus"]);
    assert_eq!(digest.item_count(), 1);
}

#[test]
fn aggregation_is_repeatable() {
    let results = single(
        "OpenAI",
        Ok(vec![
            entry("Same time one", Some(now())),
            entry("Same time two", Some(now())),
            entry("Undated", None),
        ]),
    );
    let first = aggregate(&results, &last_day());
    let second = aggregate(&results, &last_day());
    assert_eq!(first, second);
    let titles: Vec<&str> = first.entries("OpenAI").iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Same time one", "Same time two", "Undated"]);
}

#[test]
fn long_summaries_are_cut_on_a_word() {
    let mut long = entry("Long", Some(now()));
    long.summary = "word ".repeat(100);
    let options = DigestOptions {
        summary_max_chars: 22,
        ..last_day()
    };
    let digest = aggregate(&single("OpenAI", Ok(vec![long])), &options);
    assert_eq!(digest.entries("OpenAI")[0].summary, "word word word word...");
}

#[test]
fn ai_report_lists_sources_and_errors() {
    let mut results = single("OpenAI", Ok(vec![entry("Fresh", Some(now() - Duration::hours(1)))]));
    results.insert("xAI".to_string(), Ok(Vec::new()));
    results.insert(
        "Manus".to_string(),
        Err(SourceFailure {
            url: "https://manus.im/feed".to_string(),
            message: "timeout".to_string(),
        }),
    );
    let digest = aggregate(&results, &last_day());

    let markdown = render_ai_digest(&digest, 24, now());

    assert!(markdown.starts_with("# AI digest: last 24 h (until 2026-10-16 12:00 UTC)\n"));
    assert!(markdown.contains("Total items: 1\n"));
    assert!(markdown.contains("- **[Fresh](https://example.com/fresh)** (2026-10-16)\n  About Fresh\n"));
    assert!(markdown.contains("- Error fetching Manus: timeout (https://manus.im/feed)"));
    assert!(markdown.contains("## xAI\n\n_No new items._"));
    let manus = markdown.find("## Manus").unwrap();
    let openai = markdown.find("## OpenAI").unwrap();
    assert!(manus < openai);
}

fn work_item(index: usize, target: &str, status: ItemStatus, detail: Option<serde_json::Value>) -> WorkItem {
    WorkItem {
        status,
        detail,
        message: (status == ItemStatus::Error).then(|| "page crashed".to_string()),
        ..WorkItem::pending(index, target)
    }
}

#[test]
fn jobs_report_groups_by_company() {
    let acme = "https://www.linkedin.com/company/acme";
    let beta = "https://www.linkedin.com/company/beta-games";
    let gamma = "https://www.linkedin.com/company/gamma";
    let results = vec![
        work_item(
            0,
            acme,
            ItemStatus::Succeeded,
            Some(json!({
                "company_url": acme,
                "company_name": "Acme",
                "jobs": [
                    {"title": "Game Designer", "url": "https://www.linkedin.com/jobs/view/1/", "location": "Remote"},
                    {"title": "Producer", "url": "", "location": ""}
                ]
            })),
        ),
        work_item(
            1,
            beta,
            ItemStatus::Succeeded,
            Some(json!({"company_url": beta, "company_name": "Beta Games", "jobs": []})),
        ),
        work_item(2, gamma, ItemStatus::Error, None),
    ];
    let report = BatchReport {
        summary: BatchSummary::from_results(3, &results),
        interrupted: false,
        results,
    };

    let jobs = JobsDigest::from_report(&report, 20);
    assert_eq!(jobs.total_jobs(), 2);
    assert_eq!(jobs.without_jobs, vec!["Beta Games"]);
    assert_eq!(jobs.errored, vec![("Gamma".to_string(), "page crashed".to_string())]);

    let markdown = render_jobs_digest(&jobs, now());
    assert!(markdown.starts_with("# LinkedIn jobs digest: 2026-10-16\n"));
    assert!(markdown.contains("- **Companies processed:** 3\n"));
    assert!(markdown.contains("### Acme (2)\n"));
    assert!(markdown.contains("- [Game Designer](https://www.linkedin.com/jobs/view/1/), Remote\n"));
    assert!(markdown.contains("- Producer\n"));
    assert!(markdown.contains("## Companies without jobs\n\n- Beta Games\n"));
    assert!(markdown.contains("## Errors\n\n- Gamma: page crashed\n"));
}
