use std::fs;

use scout_engine::page::{Page, StaticPage};
use scout_engine::{BrowserSession, Cookie, Session, SessionStore};
use tempfile::TempDir;

fn li_cookie() -> Cookie {
    Cookie::new("li_at", "token-123").with_domain(".linkedin.com")
}

#[test]
fn missing_file_is_no_session() {
    engine_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path().join("context_state.json"));
    assert_eq!(store.load(), None);
    assert!(store.requires_login());
}

#[test]
fn corrupt_file_is_no_session() {
    engine_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("context_state.json");
    fs::write(&path, "{ not json").unwrap();
    let store = SessionStore::new(path);
    assert_eq!(store.load(), None);
}

#[test]
fn save_then_load_round_trips() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path().join("nested").join("context_state.json"));
    let session = Session {
        cookies: vec![li_cookie()],
    };
    store.save(&session).unwrap();
    assert_eq!(store.load(), Some(session));
    assert!(!store.requires_login());
}

#[test]
fn cookie_file_uses_webdriver_field_names() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("context_state.json");
    let mut cookie = li_cookie();
    cookie.http_only = Some(true);
    SessionStore::new(&path)
        .save(&Session {
            cookies: vec![cookie],
        })
        .unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"httpOnly\": true"));
    assert!(!raw.contains("sameSite"));
}

#[tokio::test]
async fn browser_session_restores_and_saves_cookies() {
    engine_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("context_state.json");
    let store = SessionStore::new(&path);
    store
        .save(&Session {
            cookies: vec![li_cookie()],
        })
        .unwrap();

    let session = BrowserSession::open(
        Box::new(StaticPage::blank()),
        store.clone(),
        "https://www.linkedin.com",
    )
    .await;
    assert_eq!(session.page().cookies().await.unwrap(), vec![li_cookie()]);

    let fresh = Cookie::new("JSESSIONID", "ajax:1").with_domain(".www.linkedin.com");
    session.page().add_cookies(&[fresh.clone()]).await.unwrap();
    session.release().await;

    let saved = store.load().unwrap();
    assert_eq!(saved.cookies, vec![li_cookie(), fresh]);
}
