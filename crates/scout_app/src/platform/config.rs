use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use scout_engine::page::WebDriverSettings;
use scout_engine::{LinkedInSettings, DEFAULT_USER_AGENT};

/// Live batches never pace faster than this.
pub const MIN_BATCH_DELAY: Duration = Duration::from_secs(3);
pub const MAX_DIGEST_HOURS: u32 = 168;

const SESSION_FILENAME: &str = "context_state.json";
const LEDGER_FILENAME: &str = "subscription_results.json";

/// Paths and browser settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base working directory.
    pub home: PathBuf,
    pub session_file: PathBuf,
    pub webdriver: WebDriverSettings,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let cwd = env::current_dir().context("cannot determine the current directory")?;
        Ok(Self::from_lookup(|key| env::var(key).ok(), &cwd))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, cwd: &Path) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let home = var("SCOUT_HOME")
            .or_else(|| var("VAULT_PATH"))
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.to_path_buf());
        let session_file = var("SCOUT_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| linkedin_dir(&home).join(SESSION_FILENAME));

        let mut webdriver = WebDriverSettings {
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            ..WebDriverSettings::default()
        };
        if let Some(endpoint) = var("SCOUT_WEBDRIVER_URL") {
            webdriver.endpoint = endpoint;
        }
        webdriver.headless = var("SCOUT_HEADLESS").is_some_and(|value| is_enabled(&value));

        Self {
            home,
            session_file,
            webdriver,
        }
    }

    /// Session, checkpoints and the follow ledger live here.
    pub fn linkedin_dir(&self) -> PathBuf {
        linkedin_dir(&self.home)
    }

    pub fn digests_dir(&self) -> PathBuf {
        self.home.join("digests")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.linkedin_dir().join(LEDGER_FILENAME)
    }

    pub fn linkedin_settings(&self) -> LinkedInSettings {
        LinkedInSettings {
            debug_dir: Some(self.linkedin_dir().join("debug")),
            ..LinkedInSettings::default()
        }
    }
}

fn linkedin_dir(home: &Path) -> PathBuf {
    home.join(".scout").join("linkedin")
}

fn is_enabled(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

pub fn batch_delay(seconds: u64) -> Duration {
    Duration::from_secs(seconds).max(MIN_BATCH_DELAY)
}

pub fn digest_hours(hours: u32) -> u32 {
    hours.clamp(1, MAX_DIGEST_HOURS)
}
