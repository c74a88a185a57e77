//! Extraction strategies for LinkedIn pages, all running on a [`DomSnapshot`].
mod company;
mod follow;
mod jobs;
mod posting;

use scout_core::StrategyError;
use serde::{Deserialize, Serialize};

use crate::page::{element_text, DomSnapshot};
use crate::PageError;

pub use company::{company_name_cascade, extract_company_name};
pub use follow::{follow_button_cascade, ButtonTextDetector, FollowDetector, FollowTarget};
pub use jobs::{dedupe_by_title, extract_job_listings, job_list_cascade, MAX_JOBS_PER_STRATEGY, MAX_RAW_JOB_IDS};
pub use posting::{extract_job_posting, JobPosting};

/// One job advertised on a company's jobs page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub location: String,
}

impl From<PageError> for StrategyError {
    fn from(err: PageError) -> Self {
        StrategyError::new(err.to_string())
    }
}

/// Text of the first element matched by the first selector that matches
/// anything, if that text is non-empty.
pub(crate) fn first_text(snapshot: &DomSnapshot, selectors: &[&str]) -> Result<Option<String>, StrategyError> {
    for css in selectors {
        if let Some(element) = snapshot.select(css)?.into_iter().next() {
            let text = element_text(element);
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}
