use std::time::Duration;

use pretty_assertions::assert_eq;
use scout_core::{ActionOutcome, ExtractionResult, ItemStatus};
use scout_engine::extract::{extract_company_name, extract_job_listings, ButtonTextDetector, JobListing};
use scout_engine::page::{Locator, StaticPage};
use scout_engine::{
    company_info, follow_company, job_posting, AuthError, BatchRunner, BatchSettings, CollectJobsAction,
    CompanyJobs, FollowCompanyAction, ItemAction, LinkedInSettings, NoCheckpoints, NO_FOLLOW_BUTTON,
};
use tempfile::TempDir;

const ACME: &str = "https://www.linkedin.com/company/acme";
const BETA: &str = "https://www.linkedin.com/company/beta";
const GAMMA: &str = "https://www.linkedin.com/company/gamma";

fn page(body: &str) -> String {
    format!("<html><head><title>Acme: Overview | LinkedIn</title></head><body>{body}</body></html>")
}

fn quick() -> LinkedInSettings {
    LinkedInSettings {
        settle: Duration::ZERO,
        ..LinkedInSettings::default()
    }
}

#[test]
fn company_name_prefers_top_card_then_falls_back_to_title() {
    let top_card = page(r#"<h1 class="org-top-card-summary__title"> Acme Games </h1>"#);
    assert_eq!(
        extract_company_name(ACME, &top_card),
        ExtractionResult::Found {
            value: "Acme Games".to_string(),
            strategy: "top card title",
        }
    );

    let bare = page("<div>nothing here</div>");
    let result = extract_company_name(ACME, &bare);
    assert_eq!(result.strategy(), Some("document title"));
    assert_eq!(result.into_option().as_deref(), Some("Acme"));
}

#[test]
fn job_cards_give_title_link_and_location() {
    let html = page(
        r#"<ul>
          <li class="jobs-list__job">
            <div class="job-card-container">
              <h3>Senior Game Designer</h3>
              <a href="/jobs/view/111/?trk=x">Senior Game Designer</a>
              <span class="job-card-container__location">Kyiv (Remote)</span>
            </div>
          </li>
          <li class="jobs-list__job">
            <div class="job-card-container">
              <h3>QA</h3>
              <a href="/jobs/view/222/">QA</a>
            </div>
          </li>
        </ul>"#,
    );
    let result = extract_job_listings(ACME, &html);
    assert_eq!(result.strategy(), Some("job cards"));
    assert_eq!(
        result.into_option().unwrap(),
        vec![JobListing {
            title: "Senior Game Designer".to_string(),
            url: "https://www.linkedin.com/jobs/view/111/?trk=x".to_string(),
            location: "Kyiv (Remote)".to_string(),
        }]
    );
}

#[test]
fn bare_job_links_are_the_second_strategy() {
    let html = page(
        r#"<section>
          <a href="https://www.linkedin.com/jobs/view/333/">Technical Artist</a>
          <p><a href="/jobs/view/444/"></a>Unity Developer, Lisbon</p>
          <a href="/jobs/view/555/">Technical   artist</a>
        </section>"#,
    );
    let result = extract_job_listings(ACME, &html);
    assert_eq!(result.strategy(), Some("job links"));
    let titles: Vec<String> = result.into_option().unwrap().into_iter().map(|j| j.title).collect();
    assert_eq!(titles, vec!["Technical Artist", "Unity Developer, Lisbon"]);
}

#[test]
fn raw_html_ids_are_the_last_resort() {
    let html = page(r#"<code>{"jobPostingUrl":"https://www.linkedin.com/jobs/view/987/"}</code>"#);
    let result = extract_job_listings(ACME, &html);
    assert_eq!(result.strategy(), Some("raw job ids"));
    let jobs = result.into_option().unwrap();
    assert_eq!(jobs[0].url, "https://www.linkedin.com/jobs/view/987/");
}

#[test]
fn page_without_jobs_is_not_found() {
    assert!(!extract_job_listings(ACME, &page("<p>No open roles</p>")).is_found());
}

#[tokio::test]
async fn follow_batch_clicks_skips_followed_and_reports_missing_buttons() {
    engine_logging::initialize_for_tests();
    let browser = StaticPage::blank()
        .with_document(ACME, page("<button>Message</button><button>Follow</button>"))
        .with_document(BETA, page("<button>Following</button>"))
        .with_document(GAMMA, page("<p>This page isn't available</p>"));
    let detector = ButtonTextDetector::default();
    let action = FollowCompanyAction::new(&browser, &detector, Duration::ZERO);
    let settings = BatchSettings {
        delay: Duration::ZERO,
        checkpoint_every: 0,
    };

    let report = BatchRunner::new(settings, &NoCheckpoints)
        .run(vec![ACME.into(), BETA.into(), GAMMA.into()], &action)
        .await;

    let statuses: Vec<ItemStatus> = report.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![ItemStatus::Succeeded, ItemStatus::AlreadySatisfied, ItemStatus::Failed]
    );
    assert_eq!(report.results[2].message.as_deref(), Some(NO_FOLLOW_BUTTON));
    assert_eq!(
        browser.clicks(),
        vec![(ACME.to_string(), Locator::css_exact("button", "Follow"))]
    );
}

#[tokio::test]
async fn single_follow_on_followed_company_is_already_satisfied() {
    let browser = StaticPage::blank().with_document(BETA, page("<button>Following</button>"));
    let result = follow_company(&browser, &ButtonTextDetector::default(), BETA, Duration::ZERO).await;
    assert!(result.success);
    assert_eq!(result.data.unwrap().status, ItemStatus::AlreadySatisfied);
    assert!(browser.clicks().is_empty());
}

#[tokio::test]
async fn company_info_reports_unknown_when_nothing_matches() {
    let browser = StaticPage::blank().with_document(ACME, "<html><body></body></html>");
    let result = company_info(&browser, ACME, Duration::ZERO).await;
    assert!(result.success);
    assert_eq!(result.data.unwrap().company_name, "Unknown");
}

#[tokio::test]
async fn jobs_action_returns_company_jobs_and_dumps_empty_pages() {
    engine_logging::initialize_for_tests();
    let debug = TempDir::new().unwrap();
    let browser = StaticPage::blank()
        .with_document(
            "https://www.linkedin.com/company/acme/jobs/",
            page(r#"<a href="/jobs/view/1/">Narrative Designer</a>"#),
        )
        .with_document("https://www.linkedin.com/company/beta/jobs/", page("<p>none</p>"));
    let settings = LinkedInSettings {
        debug_dir: Some(debug.path().to_path_buf()),
        ..quick()
    };
    let action = CollectJobsAction::new(&browser, &settings);

    let outcome = action.perform(0, ACME).await.unwrap();
    let ActionOutcome::Succeeded { detail: Some(detail) } = outcome else {
        panic!("expected jobs detail, got {outcome:?}");
    };
    let company: CompanyJobs = serde_json::from_value(detail).unwrap();
    assert_eq!(company.company_name, "Acme");
    assert_eq!(company.jobs.len(), 1);
    assert_eq!(company.strategy.as_deref(), Some("job links"));

    let empty = action.collect(BETA).await.unwrap();
    assert!(empty.jobs.is_empty());
    assert!(debug
        .path()
        .join("linkedin.com_company_beta_jobs.html")
        .exists());
}

#[tokio::test]
async fn job_posting_behind_authwall_is_an_auth_error() {
    let job = "https://www.linkedin.com/authwall?trk=job";
    let browser = StaticPage::blank().with_document(job, page("<p>Sign in to view</p>"));
    let result = job_posting(&browser, job, Duration::ZERO).await;
    assert!(matches!(result, Err(AuthError::NotLoggedIn)));
}
