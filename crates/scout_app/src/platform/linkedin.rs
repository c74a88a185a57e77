use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use engine_logging::engine_info;
use scout_core::{BatchReport, BatchSummary, CheckpointKind, OperationResult};
use scout_engine::digest::{render_jobs_digest, JobsDigest};
use scout_engine::extract::ButtonTextDetector;
use scout_engine::{
    load_checkpoint, require_login, BatchRunner, BatchSettings, CheckpointFiles, CollectJobsAction,
    FileCheckpointSink, FollowCompanyAction, ItemAction, LinkedInSettings, LoginGate, ResumePlan,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::app::{open_browser, print_result};
use super::config::{batch_delay, Config};
use super::persistence::{load_followed, read_targets, save_ledger, write_report};
use crate::cli::{FollowArgs, JobsArgs};

const FOLLOW_STEM: &str = "follow";
const JOBS_STEM: &str = "jobs";
const JOBS_REPORT_PREFIX: &str = "linkedin-jobs";

/// What a batch command prints.
#[derive(Debug, Serialize)]
struct BatchOutput {
    summary: BatchSummary,
    interrupted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ledger: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_jobs: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
enum BatchAction {
    Follow,
    CollectJobs,
}

/// One batch to run against the logged-in browser.
struct BatchJob<'a> {
    action: BatchAction,
    stem: &'static str,
    targets: Vec<String>,
    resume_from: Option<&'a Path>,
    settings: BatchSettings,
    cancel: CancellationToken,
}

pub(super) async fn login(config: &Config) -> Result<bool> {
    let session = open_browser(config).await?;
    let result = scout_engine::login(&session, &LoginGate::default(), &config.linkedin_settings()).await;
    session.release().await;
    print_result(&result)
}

pub(super) async fn follow(config: &Config, args: FollowArgs, cancel: CancellationToken) -> Result<bool> {
    let mut excluded = args.excluded.clone();
    if args.skip_followed {
        excluded.extend(load_followed(&config.ledger_path()));
    }
    let targets = read_targets(&args.file, &excluded, args.limit)?;
    if targets.is_empty() {
        return print_result(&OperationResult::<BatchOutput>::failure(format!(
            "No company URLs to follow in {}",
            args.file.display()
        )));
    }

    let job = BatchJob {
        action: BatchAction::Follow,
        stem: FOLLOW_STEM,
        targets,
        resume_from: args.resume_from.as_deref(),
        settings: BatchSettings {
            delay: batch_delay(args.delay),
            checkpoint_every: args.checkpoint_every,
        },
        cancel,
    };
    let report = match run_logged_in(config, &config.linkedin_settings(), job).await? {
        Ok(report) => report,
        Err(failure) => return print_result(&failure),
    };

    let ledger = save_ledger(&config.ledger_path(), &report);
    let s = &report.summary;
    let message = format!(
        "Followed {}, already following {}, failed {}, errors {} (of {})",
        s.succeeded, s.already_satisfied, s.failed, s.errors, s.total
    );
    let output = BatchOutput {
        summary: report.summary.clone(),
        interrupted: report.interrupted,
        ledger,
        report: None,
        total_jobs: None,
    };
    print_result(&finish(config, FOLLOW_STEM, &report, output, message))
}

pub(super) async fn follow_one(config: &Config, url: &str) -> Result<bool> {
    let settings = config.linkedin_settings();
    let session = open_browser(config).await?;
    let result = match require_login(session.page(), &LoginGate::default(), &settings).await {
        Ok(()) => {
            scout_engine::follow_company(session.page(), &ButtonTextDetector::default(), url, settings.settle).await
        }
        Err(err) => OperationResult::failure(err.to_string()),
    };
    session.release().await;
    print_result(&result)
}

pub(super) async fn company_info(config: &Config, url: &str) -> Result<bool> {
    let settings = config.linkedin_settings();
    let session = open_browser(config).await?;
    let result = scout_engine::company_info(session.page(), url, settings.settle).await;
    session.release().await;
    print_result(&result)
}

pub(super) async fn jobs(config: &Config, args: JobsArgs, cancel: CancellationToken) -> Result<bool> {
    let targets = match &args.file {
        Some(file) => read_targets(file, &[], args.limit)?,
        None => {
            let mut followed = load_followed(&config.ledger_path());
            if let Some(limit) = args.limit {
                followed.truncate(limit);
            }
            followed
        }
    };
    if targets.is_empty() {
        return print_result(&OperationResult::<BatchOutput>::failure(
            "No companies to check. Pass a file of company URLs or run `scout follow` first.",
        ));
    }

    let job = BatchJob {
        action: BatchAction::CollectJobs,
        stem: JOBS_STEM,
        targets,
        resume_from: args.resume_from.as_deref(),
        settings: BatchSettings {
            delay: batch_delay(args.delay),
            checkpoint_every: args.checkpoint_every,
        },
        cancel,
    };
    let report = match run_logged_in(config, &config.linkedin_settings(), job).await? {
        Ok(report) => report,
        Err(failure) => return print_result(&failure),
    };

    let now = Utc::now();
    let digest = JobsDigest::from_report(&report, args.per_company);
    let markdown = render_jobs_digest(&digest, now);
    let path = write_report(&config.digests_dir(), JOBS_REPORT_PREFIX, now.date_naive(), &markdown)?;
    let message = format!(
        "{} jobs at {} of {} companies",
        digest.total_jobs(),
        digest.digest.groups.len(),
        digest.companies_processed
    );
    let output = BatchOutput {
        summary: report.summary.clone(),
        interrupted: report.interrupted,
        ledger: None,
        report: Some(path),
        total_jobs: Some(digest.total_jobs()),
    };
    print_result(&finish(config, JOBS_STEM, &report, output, message))
}

pub(super) async fn job(config: &Config, url: &str) -> Result<bool> {
    let settings = config.linkedin_settings();
    let session = open_browser(config).await?;
    let result = scout_engine::job_posting_result(session.page(), url, settings.settle).await;
    session.release().await;
    print_result(&result)
}

/// Opens the browser, checks the login, runs the batch and releases the
/// browser on every path. The inner `Err` is a failure to print, not a
/// setup error.
async fn run_logged_in(
    config: &Config,
    settings: &LinkedInSettings,
    job: BatchJob<'_>,
) -> Result<Result<BatchReport, OperationResult<BatchOutput>>> {
    let plan = match job.resume_from {
        Some(path) => {
            let checkpoint =
                load_checkpoint(path).with_context(|| format!("cannot read checkpoint {}", path.display()))?;
            let plan = ResumePlan::new(job.targets, &checkpoint);
            engine_info!(
                "resuming: {} done in checkpoint, {} remaining",
                plan.prior.len(),
                plan.remaining.len()
            );
            plan
        }
        None => ResumePlan {
            prior: Vec::new(),
            remaining: job.targets,
        },
    };

    let session = open_browser(config).await?;
    let outcome = match require_login(session.page(), &LoginGate::default(), settings).await {
        Ok(()) => {
            let detector = ButtonTextDetector::default();
            let action: Box<dyn ItemAction + '_> = match job.action {
                BatchAction::Follow => Box::new(FollowCompanyAction::new(session.page(), &detector, settings.settle)),
                BatchAction::CollectJobs => Box::new(CollectJobsAction::new(session.page(), settings)),
            };
            let files =
                FileCheckpointSink::new(CheckpointFiles::new(config.linkedin_dir(), job.stem)).with_session(&session);
            let report = {
                let sink = plan.checkpoint_sink(&files);
                BatchRunner::new(job.settings, &sink)
                    .with_cancellation(job.cancel)
                    .run(plan.remaining.clone(), action.as_ref())
                    .await
            };
            Ok(plan.merge(report))
        }
        Err(err) => Err(OperationResult::failure(err.to_string())),
    };
    session.release().await;
    Ok(outcome)
}

/// An interrupted batch is a failure pointing at its partial checkpoint.
fn finish(
    config: &Config,
    stem: &str,
    report: &BatchReport,
    output: BatchOutput,
    message: String,
) -> OperationResult<BatchOutput> {
    if report.interrupted {
        let partial = CheckpointFiles::new(config.linkedin_dir(), stem).path(CheckpointKind::Partial);
        OperationResult::failure(format!(
            "Interrupted after {} of {}. Resume with --resume-from {}",
            report.summary.attempted,
            report.summary.total,
            partial.display()
        ))
        .with_data(output)
    } else {
        OperationResult::ok(output).with_message(message)
    }
}
