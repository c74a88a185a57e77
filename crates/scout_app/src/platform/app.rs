use anyhow::{Context, Result};
use engine_logging::{engine_info, engine_warn};
use scout_core::urls::LINKEDIN_ORIGIN;
use scout_core::OperationResult;
use scout_engine::page::WebDriverPage;
use scout_engine::{BrowserSession, SessionStore};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::config::Config;
use super::{digest, extract, linkedin, logging};
use crate::cli::{Cli, Command};

/// Runs one command. `Ok(false)` means the operation itself reported a
/// failure; errors are reserved for setup problems.
pub async fn run_app(cli: Cli) -> Result<bool> {
    let config = Config::from_env()?;
    logging::initialize(cli.log_to, &config.home);
    engine_info!("scout home: {}", config.home.display());

    match cli.command {
        Command::Login => linkedin::login(&config).await,
        Command::Follow(args) => linkedin::follow(&config, args, interrupt_token()).await,
        Command::FollowOne { url } => linkedin::follow_one(&config, &url).await,
        Command::CompanyInfo { url } => linkedin::company_info(&config, &url).await,
        Command::Jobs(args) => linkedin::jobs(&config, args, interrupt_token()).await,
        Command::Job { url } => linkedin::job(&config, &url).await,
        Command::AiDigest(args) => digest::ai_digest(&config, args).await,
        Command::Extract(args) => extract::run(args),
    }
}

/// Starts a browser through the WebDriver server and restores the saved
/// LinkedIn cookies into it.
pub(super) async fn open_browser(config: &Config) -> Result<BrowserSession> {
    let page = WebDriverPage::connect(&config.webdriver)
        .await
        .with_context(|| {
            format!(
                "could not start a browser via {}; is a WebDriver server running?",
                config.webdriver.endpoint
            )
        })?;
    let store = SessionStore::new(&config.session_file);
    Ok(BrowserSession::open(Box::new(page), store, LINKEDIN_ORIGIN).await)
}

/// Cancelled on Ctrl-C; batches stop between items and keep their partial results.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            engine_warn!("interrupt received; stopping after the current item");
            trigger.cancel();
        }
    });
    token
}

/// Prints the result as pretty JSON on stdout and reports whether it succeeded.
pub(super) fn print_result<T: Serialize>(result: &OperationResult<T>) -> Result<bool> {
    let json = serde_json::to_string_pretty(result).context("cannot serialize result")?;
    println!("{json}");
    Ok(result.success)
}
