use std::time::Duration;

use scout_engine::page::StaticPage;
use scout_engine::LoginGate;
use tokio::time::Instant;

const ANONYMOUS: &str = r#"<html><body><a href="/login">Sign in</a><h1>Join now</h1></body></html>"#;
const MEMBER: &str = r#"<html><body><nav><button aria-label="Me">Me</button></nav></body></html>"#;

#[tokio::test(start_paused = true)]
async fn never_authenticated_page_times_out_after_max_wait() {
    engine_logging::initialize_for_tests();
    let page = StaticPage::new("https://www.linkedin.com/login", ANONYMOUS);
    let gate = LoginGate::default();

    let started = Instant::now();
    let logged_in = gate
        .await_login(&page, Duration::from_secs(5), Duration::from_secs(10))
        .await;

    assert!(!logged_in);
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(10), "waited {waited:?}");
    assert!(waited < Duration::from_secs(11), "waited {waited:?}");
}

#[tokio::test(start_paused = true)]
async fn member_marker_authenticates_immediately() {
    let page = StaticPage::new("https://www.linkedin.com/login", MEMBER);
    let gate = LoginGate::default();

    let started = Instant::now();
    assert!(
        gate.await_login(&page, Duration::from_secs(5), Duration::from_secs(300))
            .await
    );
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn sign_in_prompt_overrides_member_url() {
    let page = StaticPage::new("https://www.linkedin.com/feed/", ANONYMOUS);
    assert!(!LoginGate::default().is_authenticated(&page).await);
}

#[tokio::test]
async fn member_area_url_alone_is_enough() {
    let page = StaticPage::new("https://www.linkedin.com/feed/", "<html><body><main>posts</main></body></html>");
    assert!(LoginGate::default().is_authenticated(&page).await);
}
