//! LinkedIn operations: login, following companies, company info, job
//! listings and job postings.
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use engine_logging::{engine_debug, engine_info, engine_warn};
use scout_core::urls::{
    company_display_name, company_jobs_url, is_auth_wall, LINKEDIN_FEED_URL, LINKEDIN_LOGIN_URL,
};
use scout_core::{ActionOutcome, ExtractionResult, ItemIndex, ItemStatus, OperationResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::ItemAction;
use crate::extract::{
    extract_company_name, extract_job_listings, extract_job_posting, FollowDetector, JobListing,
    JobPosting,
};
use crate::filename::page_dump_name;
use crate::login::LoginGate;
use crate::page::{capture, open, DomSnapshot, Locator, Page};
use crate::persist::AtomicFileWriter;
use crate::session::BrowserSession;
use crate::PageError;

pub const NOT_LOGGED_IN: &str = "Not logged in. Run `scout login` first.";
pub const NO_FOLLOW_BUTTON: &str = "Could not find Follow button";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not logged in. Run `scout login` first.")]
    NotLoggedIn,
    #[error(transparent)]
    Page(#[from] PageError),
}

#[derive(Debug, Clone)]
pub struct LinkedInSettings {
    /// Pause after every navigation for dynamic content.
    pub settle: Duration,
    pub login_poll: Duration,
    pub login_max_wait: Duration,
    /// Where page sources are saved when job extraction finds nothing.
    pub debug_dir: Option<PathBuf>,
}

impl Default for LinkedInSettings {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(2),
            login_poll: Duration::from_secs(5),
            login_max_wait: Duration::from_secs(300),
            debug_dir: None,
        }
    }
}

/// Interactive login. The session is saved on success.
pub async fn login(session: &BrowserSession, gate: &LoginGate, settings: &LinkedInSettings) -> OperationResult<()> {
    let page = session.page();
    if let Err(err) = open(page, LINKEDIN_LOGIN_URL, settings.settle).await {
        return OperationResult::failure(format!("could not open login page: {err}"));
    }
    if gate.is_authenticated(page).await {
        session.persist().await;
        return OperationResult::done("Already logged in. Session saved.");
    }
    engine_info!("log in in the browser window; waiting...");
    if gate
        .await_login(page, settings.login_poll, settings.login_max_wait)
        .await
    {
        if session.persist().await {
            OperationResult::done(format!(
                "Logged in. Session saved to {}",
                session.store().path().display()
            ))
        } else {
            OperationResult::failure("Logged in, but the session could not be saved")
        }
    } else {
        OperationResult::failure(format!(
            "Login not detected within {}s. Run `scout login` again.",
            settings.login_max_wait.as_secs()
        ))
    }
}

/// Opens the feed and fails unless the page shows a signed-in member.
pub async fn require_login(page: &dyn Page, gate: &LoginGate, settings: &LinkedInSettings) -> Result<(), AuthError> {
    open(page, LINKEDIN_FEED_URL, settings.settle).await?;
    if gate.is_authenticated(page).await {
        Ok(())
    } else {
        Err(AuthError::NotLoggedIn)
    }
}

/// Follows one company per item. A page already showing `Following`
/// is reported as already satisfied without clicking.
pub struct FollowCompanyAction<'a> {
    page: &'a dyn Page,
    detector: &'a dyn FollowDetector,
    settle: Duration,
}

impl<'a> FollowCompanyAction<'a> {
    pub fn new(page: &'a dyn Page, detector: &'a dyn FollowDetector, settle: Duration) -> Self {
        Self {
            page,
            detector,
            settle,
        }
    }
}

enum FollowDecision {
    Already,
    Click(Locator, &'static str),
    Missing,
}

#[async_trait]
impl ItemAction for FollowCompanyAction<'_> {
    async fn perform(&self, _index: ItemIndex, target: &str) -> anyhow::Result<ActionOutcome> {
        open(self.page, target, self.settle)
            .await
            .with_context(|| format!("could not open {target}"))?;
        let (url, html) = capture(self.page).await?;
        if is_auth_wall(&url) {
            anyhow::bail!(NOT_LOGGED_IN);
        }
        let decision = {
            let snapshot = DomSnapshot::parse(url, html);
            if self.detector.already_following(&snapshot) {
                FollowDecision::Already
            } else {
                match self.detector.follow_button(&snapshot) {
                    ExtractionResult::Found { value, strategy } => FollowDecision::Click(value.locator, strategy),
                    ExtractionResult::NotFound => FollowDecision::Missing,
                }
            }
        };
        match decision {
            FollowDecision::Already => Ok(ActionOutcome::AlreadySatisfied),
            FollowDecision::Click(locator, strategy) => {
                engine_debug!("clicking follow button found by {strategy}: {locator}");
                self.page.click(&locator).await?;
                Ok(ActionOutcome::succeeded())
            }
            FollowDecision::Missing => {
                engine_info!("no follow button on {target}");
                Ok(ActionOutcome::failed(NO_FOLLOW_BUTTON))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowResult {
    pub company_url: String,
    pub status: ItemStatus,
}

/// Follows a single company outside of a batch.
pub async fn follow_company(
    page: &dyn Page,
    detector: &dyn FollowDetector,
    company_url: &str,
    settle: Duration,
) -> OperationResult<FollowResult> {
    let action = FollowCompanyAction::new(page, detector, settle);
    let result = |status| FollowResult {
        company_url: company_url.to_string(),
        status,
    };
    match action.perform(0, company_url).await {
        Ok(ActionOutcome::Succeeded { .. }) => OperationResult::ok(result(ItemStatus::Succeeded))
            .with_message("Successfully followed company"),
        Ok(ActionOutcome::AlreadySatisfied) => OperationResult::ok(result(ItemStatus::AlreadySatisfied))
            .with_message("Already following this company"),
        Ok(ActionOutcome::Failed { reason }) => OperationResult::failure(format!(
            "{reason}. Company page may require login or have restrictions."
        ))
        .with_data(result(ItemStatus::Failed)),
        Err(err) => OperationResult::failure(format!("{err:#}")).with_data(result(ItemStatus::Error)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyInfo {
    pub company_url: String,
    pub company_name: String,
}

/// Company name from the company page; `Unknown` when no strategy finds one.
pub async fn company_info(page: &dyn Page, company_url: &str, settle: Duration) -> OperationResult<CompanyInfo> {
    let captured = async {
        open(page, company_url, settle).await?;
        capture(page).await
    }
    .await;
    let (url, html) = match captured {
        Ok(captured) => captured,
        Err(err) => return OperationResult::failure(err.to_string()),
    };
    let company_name = match extract_company_name(&url, &html) {
        ExtractionResult::Found { value, strategy } => {
            engine_debug!("company name found by {strategy}");
            value
        }
        ExtractionResult::NotFound => {
            engine_info!("company name not found on {company_url}");
            "Unknown".to_string()
        }
    };
    OperationResult::ok(CompanyInfo {
        company_url: company_url.to_string(),
        company_name,
    })
}

/// Listings found on one company's jobs page; the `detail` of a jobs batch item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyJobs {
    pub company_url: String,
    pub company_name: String,
    pub jobs: Vec<JobListing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

/// Collects the listings of one company per item. Finding none is a
/// success with an empty list.
pub struct CollectJobsAction<'a> {
    page: &'a dyn Page,
    settle: Duration,
    debug_dump: Option<AtomicFileWriter>,
}

impl<'a> CollectJobsAction<'a> {
    pub fn new(page: &'a dyn Page, settings: &LinkedInSettings) -> Self {
        Self {
            page,
            settle: settings.settle,
            debug_dump: settings.debug_dir.clone().map(AtomicFileWriter::new),
        }
    }

    pub async fn collect(&self, company_url: &str) -> anyhow::Result<CompanyJobs> {
        let jobs_url = company_jobs_url(company_url);
        open(self.page, &jobs_url, self.settle)
            .await
            .with_context(|| format!("could not open {jobs_url}"))?;
        let (url, html) = capture(self.page).await?;
        if is_auth_wall(&url) {
            anyhow::bail!(NOT_LOGGED_IN);
        }
        let extracted = extract_job_listings(&url, &html);
        let strategy = extracted.strategy().map(str::to_string);
        let jobs = match extracted.into_option() {
            Some(jobs) => jobs,
            None => {
                engine_info!("no job listings found on {jobs_url}");
                self.dump_page(&jobs_url, &html);
                Vec::new()
            }
        };
        Ok(CompanyJobs {
            company_url: company_url.to_string(),
            company_name: company_display_name(company_url),
            jobs,
            strategy,
        })
    }

    fn dump_page(&self, url: &str, html: &str) {
        let Some(writer) = &self.debug_dump else {
            return;
        };
        match writer.write(&page_dump_name(url), html) {
            Ok(path) => engine_debug!("saved page source to {}", path.display()),
            Err(err) => engine_warn!("could not save page source: {err}"),
        }
    }
}

#[async_trait]
impl ItemAction for CollectJobsAction<'_> {
    async fn perform(&self, _index: ItemIndex, target: &str) -> anyhow::Result<ActionOutcome> {
        let company = self.collect(target).await?;
        engine_info!("{} jobs at {}", company.jobs.len(), company.company_name);
        Ok(ActionOutcome::succeeded_with(serde_json::to_value(&company)?))
    }
}

/// Details of one job posting. A login or authwall redirect is an
/// authentication failure.
pub async fn job_posting(page: &dyn Page, job_url: &str, settle: Duration) -> Result<Option<JobPosting>, AuthError> {
    open(page, job_url, settle).await?;
    let (url, html) = capture(page).await?;
    if is_auth_wall(&url) {
        return Err(AuthError::NotLoggedIn);
    }
    Ok(extract_job_posting(&url, &html))
}

/// [`job_posting`] as a user-facing result.
pub async fn job_posting_result(page: &dyn Page, job_url: &str, settle: Duration) -> OperationResult<JobPosting> {
    match job_posting(page, job_url, settle).await {
        Ok(Some(posting)) => OperationResult::ok(posting),
        Ok(None) => OperationResult::failure(format!("No job description found on {job_url}")),
        Err(err) => OperationResult::failure(err.to_string()),
    }
}
