use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::platform::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "scout")]
#[command(about = "LinkedIn automation and AI news digests over a saved browser session")]
pub struct Cli {
    /// Where log output goes.
    #[arg(long, value_enum, default_value_t = LogDestination::Both, global = true)]
    pub log_to: LogDestination,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a browser, wait for a manual LinkedIn login and save the session
    Login,
    /// Follow every company listed in a file (CSV export or any text with company URLs)
    Follow(FollowArgs),
    /// Follow a single company
    FollowOne {
        /// Company page URL
        url: String,
    },
    /// Print a company's name as shown on its page
    CompanyInfo {
        /// Company page URL
        url: String,
    },
    /// Collect open jobs of companies and write a jobs digest
    Jobs(JobsArgs),
    /// Print the details of one job posting
    Job {
        /// Job posting URL
        url: String,
    },
    /// Fetch AI news feeds and write a digest of the last hours
    AiDigest(DigestArgs),
    /// Run an extraction on a saved HTML page, without a browser
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
pub struct FollowArgs {
    /// File containing company URLs
    pub file: PathBuf,

    /// Seconds between companies (at least 3)
    #[arg(long, default_value_t = 20)]
    pub delay: u64,

    /// Write a checkpoint every N companies (0 disables)
    #[arg(long, default_value_t = 10)]
    pub checkpoint_every: usize,

    /// Only process the first N companies
    #[arg(long)]
    pub limit: Option<usize>,

    /// Company URLs to skip
    #[arg(long = "exclude", value_name = "URL")]
    pub excluded: Vec<String>,

    /// Skip companies the follow ledger already reports as followed
    #[arg(long)]
    pub skip_followed: bool,

    /// Checkpoint file of an interrupted run; its companies are not attempted again
    #[arg(long, value_name = "CHECKPOINT")]
    pub resume_from: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct JobsArgs {
    /// File containing company URLs; defaults to the companies in the follow ledger
    pub file: Option<PathBuf>,

    /// Seconds between companies (at least 3)
    #[arg(long, default_value_t = 8)]
    pub delay: u64,

    /// Write a checkpoint every N companies (0 disables)
    #[arg(long, default_value_t = 10)]
    pub checkpoint_every: usize,

    /// Only process the first N companies
    #[arg(long)]
    pub limit: Option<usize>,

    /// Most jobs listed per company in the report
    #[arg(long, default_value_t = 30)]
    pub per_company: usize,

    /// Checkpoint file of an interrupted run; its companies are not attempted again
    #[arg(long, value_name = "CHECKPOINT")]
    pub resume_from: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct DigestArgs {
    /// Size of the time window in hours (1 to 168)
    #[arg(long, default_value_t = 24)]
    pub hours: u32,

    /// Most items shown per source
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Most recent items considered per source before the time window applies
    #[arg(long, default_value_t = 30)]
    pub cap: usize,

    /// Print the digest instead of writing it to the digests directory
    #[arg(long)]
    pub no_write: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Goal {
    Company,
    Jobs,
    Follow,
    Posting,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Saved page source
    #[arg(long)]
    pub html: PathBuf,

    #[arg(long, value_enum)]
    pub goal: Goal,

    /// URL the page was saved from
    #[arg(long, default_value = "https://www.linkedin.com/")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_defaults_match_live_pacing() {
        let cli = Cli::try_parse_from(["scout", "follow", "companies.csv"]).unwrap();
        let Command::Follow(args) = cli.command else {
            panic!("expected follow");
        };
        assert_eq!(args.delay, 20);
        assert_eq!(args.checkpoint_every, 10);
        assert!(args.excluded.is_empty());
        assert_eq!(cli.log_to, LogDestination::Both);
    }

    #[test]
    fn jobs_file_is_optional() {
        let cli = Cli::try_parse_from(["scout", "jobs", "--delay", "12"]).unwrap();
        let Command::Jobs(args) = cli.command else {
            panic!("expected jobs");
        };
        assert_eq!(args.file, None);
        assert_eq!(args.delay, 12);
    }

    #[test]
    fn exclusions_repeat() {
        let cli = Cli::try_parse_from([
            "scout",
            "follow",
            "list.txt",
            "--exclude",
            "https://www.linkedin.com/company/a",
            "--exclude",
            "https://www.linkedin.com/company/b",
            "--log-to",
            "terminal",
        ])
        .unwrap();
        let Command::Follow(args) = cli.command else {
            panic!("expected follow");
        };
        assert_eq!(args.excluded.len(), 2);
        assert_eq!(cli.log_to, LogDestination::Terminal);
    }

    #[test]
    fn extract_requires_a_known_goal() {
        assert!(Cli::try_parse_from(["scout", "extract", "--html", "p.html", "--goal", "salary"]).is_err());
        let cli = Cli::try_parse_from(["scout", "extract", "--html", "p.html", "--goal", "posting"]).unwrap();
        let Command::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.goal, Goal::Posting);
    }
}
