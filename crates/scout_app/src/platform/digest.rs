use std::path::PathBuf;

use anyhow::Result;
use chrono::{TimeDelta, Utc};
use engine_logging::{engine_info, engine_warn};
use scout_core::OperationResult;
use scout_engine::digest::{aggregate, render_ai_digest, DigestOptions};
use scout_engine::{default_sources, fetch_all, FetchSettings, ReqwestFetcher};
use serde::Serialize;

use super::app::print_result;
use super::config::{digest_hours, Config};
use super::persistence::write_report;
use crate::cli::DigestArgs;

const REPORT_PREFIX: &str = "ai-digest";

#[derive(Debug, Serialize)]
struct DigestOutput {
    hours: u32,
    items: usize,
    failed_sources: Vec<String>,
    report: PathBuf,
}

pub(super) async fn ai_digest(config: &Config, args: DigestArgs) -> Result<bool> {
    let hours = digest_hours(args.hours);
    let now = Utc::now();
    let sources = default_sources();
    engine_info!("fetching {} sources for the last {hours} h", sources.len());
    let fetcher = ReqwestFetcher::new(FetchSettings::default())?;
    let results = fetch_all(&fetcher, &sources).await;

    let options = DigestOptions {
        since: Some(now - TimeDelta::hours(i64::from(hours))),
        per_source_limit: args.limit,
        per_source_cap: args.cap,
        ..DigestOptions::default()
    };
    let digest = aggregate(&results, &options);
    let failed_sources: Vec<String> = digest.failed_sources().into_iter().map(str::to_string).collect();
    if !failed_sources.is_empty() {
        engine_warn!("sources failed: {}", failed_sources.join(", "));
    }
    let markdown = render_ai_digest(&digest, hours, now);

    if args.no_write {
        print!("{markdown}");
        return Ok(true);
    }
    let report = write_report(&config.digests_dir(), REPORT_PREFIX, now.date_naive(), &markdown)?;
    let items = digest.item_count();
    print_result(
        &OperationResult::ok(DigestOutput {
            hours,
            items,
            failed_sources,
            report,
        })
        .with_message(format!("{items} items in the last {hours} h")),
    )
}
