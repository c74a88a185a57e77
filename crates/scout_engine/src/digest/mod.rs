//! Time-windowed, per-source digests and their markdown reports.
mod aggregate;
mod report;

pub use aggregate::{aggregate, Digest, DigestEntry, DigestOptions, FeedEntry, SourceFailure, SourceResult};
pub use report::{render_ai_digest, render_jobs_digest, JobsDigest};
