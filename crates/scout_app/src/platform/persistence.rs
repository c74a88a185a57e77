use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use engine_logging::{engine_error, engine_info, engine_warn};
use scout_core::BatchReport;
use scout_engine::targets::{company_urls_from_text, exclude, followed_companies, merge_ledger};
use scout_engine::{
    dated_report_name, ensure_output_dir, read_json_file, write_json_file, AtomicFileWriter, PersistError,
};

/// Company URLs found in `file`, minus exclusions, at most `limit`.
pub(crate) fn read_targets(file: &Path, excluded: &[String], limit: Option<usize>) -> Result<Vec<String>> {
    let text = fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))?;
    let mut targets = exclude(company_urls_from_text(&text), excluded);
    if let Some(limit) = limit {
        targets.truncate(limit);
    }
    engine_info!("{} company URLs from {}", targets.len(), file.display());
    Ok(targets)
}

fn load_ledger(ledger_path: &Path) -> Option<BatchReport> {
    match read_json_file::<BatchReport>(ledger_path) {
        Ok(ledger) => Some(ledger),
        Err(PersistError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            engine_warn!("Failed to read follow ledger {:?}: {}", ledger_path, err);
            None
        }
    }
}

/// Companies reported as followed by the ledger; empty when there is no ledger yet.
pub(crate) fn load_followed(ledger_path: &Path) -> Vec<String> {
    load_ledger(ledger_path)
        .map(|ledger| followed_companies(&ledger))
        .unwrap_or_default()
}

/// Merges `report` into the ledger at `ledger_path` and writes it back.
pub(crate) fn save_ledger(ledger_path: &Path, report: &BatchReport) -> Option<PathBuf> {
    let ledger = match load_ledger(ledger_path) {
        Some(prior) => merge_ledger(prior, report),
        None => report.clone(),
    };
    match write_json_file(ledger_path, &ledger) {
        Ok(()) => {
            engine_info!("Saved follow ledger to {:?}", ledger_path);
            Some(ledger_path.to_path_buf())
        }
        Err(err) => {
            engine_error!("Failed to save follow ledger to {:?}: {}", ledger_path, err);
            None
        }
    }
}

/// Writes `<prefix>-<date>.md` into `dir`, replacing a report of the same day.
pub(crate) fn write_report(dir: &Path, prefix: &str, date: NaiveDate, markdown: &str) -> Result<PathBuf> {
    ensure_output_dir(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    let path = AtomicFileWriter::new(dir.to_path_buf())
        .write(&dated_report_name(prefix, date), markdown)
        .with_context(|| format!("cannot write report into {}", dir.display()))?;
    engine_info!("Wrote report to {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use scout_core::{BatchSummary, ItemStatus, WorkItem};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn targets_are_limited_after_exclusion() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("companies.csv");
        fs::write(
            &file,
            "https://www.linkedin.com/company/a\nhttps://www.linkedin.com/company/b\nhttps://www.linkedin.com/company/c\n",
        )
        .unwrap();

        let targets = read_targets(&file, &["https://linkedin.com/company/a/".to_string()], Some(1)).unwrap();
        assert_eq!(targets, vec!["https://www.linkedin.com/company/b".to_string()]);
    }

    #[test]
    fn missing_ledger_means_nothing_followed() {
        let temp = TempDir::new().unwrap();
        assert!(load_followed(&temp.path().join("subscription_results.json")).is_empty());
    }

    #[test]
    fn ledger_round_trips_followed_companies() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".scout").join("subscription_results.json");
        let results = vec![
            WorkItem {
                status: ItemStatus::Succeeded,
                ..WorkItem::pending(0, "https://www.linkedin.com/company/a")
            },
            WorkItem {
                status: ItemStatus::Failed,
                ..WorkItem::pending(1, "https://www.linkedin.com/company/b")
            },
        ];
        let report = BatchReport {
            summary: BatchSummary::from_results(2, &results),
            interrupted: false,
            results,
        };

        assert_eq!(save_ledger(&path, &report), Some(path.clone()));
        assert_eq!(load_followed(&path), vec!["https://www.linkedin.com/company/a".to_string()]);
    }

    #[test]
    fn later_runs_add_to_the_ledger() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("subscription_results.json");
        let report = |target: &str| {
            let results = vec![WorkItem {
                status: ItemStatus::Succeeded,
                ..WorkItem::pending(0, target)
            }];
            BatchReport {
                summary: BatchSummary::from_results(1, &results),
                interrupted: false,
                results,
            }
        };

        save_ledger(&path, &report("https://www.linkedin.com/company/a"));
        save_ledger(&path, &report("https://www.linkedin.com/company/b"));

        assert_eq!(
            load_followed(&path),
            vec![
                "https://www.linkedin.com/company/a".to_string(),
                "https://www.linkedin.com/company/b".to_string(),
            ]
        );
    }

    #[test]
    fn report_name_carries_the_date() {
        let temp = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let path = write_report(&temp.path().join("digests"), "ai-digest", date, "# digest").unwrap();
        assert!(path.ends_with("ai-digest-2026-10-16.md"));
        assert_eq!(fs::read_to_string(path).unwrap(), "# digest");
    }
}
