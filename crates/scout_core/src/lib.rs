//! Scout core: pure data model and state machines for batch automation.
mod batch;
mod cascade;
mod checkpoint;
mod item;
mod login;
mod outcome;
pub mod urls;

pub use batch::{update, BatchPhase, BatchState, Effect, Msg};
pub use cascade::{Attempt, AttemptOutcome, Cascade, ExtractionResult, StrategyError};
pub use checkpoint::{BatchReport, BatchSummary, Checkpoint, CheckpointKind};
pub use item::{ActionOutcome, ItemIndex, ItemStatus, WorkItem};
pub use login::{LoginPoll, LoginState};
pub use outcome::OperationResult;
