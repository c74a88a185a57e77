//! Scout engine: browser pages, sessions, extraction, batch execution,
//! feeds and digests.
mod batch;
pub mod digest;
pub mod extract;
mod feeds;
mod fetch;
mod filename;
mod linkedin;
mod login;
pub mod page;
mod persist;
mod session;
pub mod targets;
pub mod text;
mod types;

pub use batch::{
    load_checkpoint, BatchRunner, BatchSettings, CheckpointFiles, CheckpointSink, FileCheckpointSink,
    ItemAction, NoCheckpoints, ResumePlan, ResumeSink,
};
pub use feeds::{default_sources, fetch_all, fetch_source, parse_feed, FeedSource};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use filename::{dated_report_name, page_dump_name, sanitize_name};
pub use linkedin::{
    company_info, follow_company, job_posting, job_posting_result, login, require_login, AuthError,
    CollectJobsAction, CompanyInfo, CompanyJobs, FollowCompanyAction, FollowResult, LinkedInSettings,
    NOT_LOGGED_IN, NO_FOLLOW_BUTTON,
};
pub use login::{LoginGate, LoginSignals};
pub use persist::{ensure_output_dir, read_json_file, write_json_file, AtomicFileWriter, PersistError};
pub use session::{BrowserSession, Session, SessionError, SessionStore};
pub use types::{Cookie, FailureKind, FetchError, FetchMetadata, FetchOutput, PageError};
