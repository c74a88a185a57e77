//! Sequential, rate-limited execution of the core batch state machine.
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use engine_logging::{engine_error, engine_info, engine_warn};
use scout_core::{
    update, ActionOutcome, BatchReport, BatchState, BatchSummary, Checkpoint, CheckpointKind, Effect,
    ItemIndex, Msg, WorkItem,
};
use tokio_util::sync::CancellationToken;

use crate::persist::{read_json_file, AtomicFileWriter, PersistError};
use crate::session::BrowserSession;

/// The per-item work of a batch. An `Err` is recorded as status `error` and
/// the batch moves on.
#[async_trait]
pub trait ItemAction: Send + Sync {
    async fn perform(&self, index: ItemIndex, target: &str) -> anyhow::Result<ActionOutcome>;
}

/// Receives checkpoints. Implementations log their own failures; a failed
/// save never stops the batch.
#[async_trait]
pub trait CheckpointSink: Send + Sync {
    async fn save(&self, kind: CheckpointKind, checkpoint: &Checkpoint);
}

/// Checkpoint sink that drops everything.
pub struct NoCheckpoints;

#[async_trait]
impl CheckpointSink for NoCheckpoints {
    async fn save(&self, _kind: CheckpointKind, _checkpoint: &Checkpoint) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub delay: Duration,
    /// Periodic checkpoint every N items; 0 disables.
    pub checkpoint_every: usize,
}

pub struct BatchRunner<'a> {
    settings: BatchSettings,
    sink: &'a dyn CheckpointSink,
    cancel: CancellationToken,
}

impl<'a> BatchRunner<'a> {
    pub fn new(settings: BatchSettings, sink: &'a dyn CheckpointSink) -> Self {
        Self {
            settings,
            sink,
            cancel: CancellationToken::new(),
        }
    }

    /// Cancelling `token` stops the run before the next item.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Runs `action` over `targets` in order, one at a time.
    pub async fn run(&self, targets: Vec<String>, action: &dyn ItemAction) -> BatchReport {
        let total = targets.len();
        engine_info!(
            "starting batch of {total} items (delay {}s, checkpoint every {})",
            self.settings.delay.as_secs_f32(),
            self.settings.checkpoint_every
        );
        let state = BatchState::new(targets, self.settings.delay, self.settings.checkpoint_every);
        let (mut state, effects) = update(state, Msg::Start);
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            let msg = match effect {
                Effect::ProcessItem { index, target } => {
                    if self.cancel.is_cancelled() {
                        Some(Msg::CancelRequested)
                    } else {
                        Some(self.process(index, total, &target, action).await)
                    }
                }
                Effect::Wait(delay) => {
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => Some(Msg::CancelRequested),
                        _ = tokio::time::sleep(delay) => None,
                    }
                }
                Effect::SaveCheckpoint { kind, checkpoint } => {
                    self.sink.save(kind, &checkpoint).await;
                    None
                }
                Effect::Finished {
                    summary,
                    interrupted,
                } => {
                    engine_logging::clear_batch_position();
                    if interrupted {
                        engine_warn!("batch interrupted: {summary}");
                    } else {
                        engine_info!("batch finished: {summary}");
                    }
                    None
                }
            };
            if let Some(msg) = msg {
                if msg == Msg::CancelRequested {
                    engine_warn!("cancel requested; stopping before the next item");
                    queue.clear();
                }
                let (next, effects) = update(state, msg);
                state = next;
                queue.extend(effects);
            }
        }
        engine_logging::clear_batch_position();
        state.into_report()
    }

    async fn process(&self, index: ItemIndex, total: usize, target: &str, action: &dyn ItemAction) -> Msg {
        engine_logging::set_batch_position(index + 1, total);
        engine_info!("processing {target}");
        let result = match action.perform(index, target).await {
            Ok(outcome) => {
                match &outcome {
                    ActionOutcome::Succeeded { .. } => engine_info!("succeeded"),
                    ActionOutcome::AlreadySatisfied => engine_info!("already satisfied"),
                    ActionOutcome::Failed { reason } => engine_info!("failed: {reason}"),
                }
                Ok(outcome)
            }
            Err(err) => {
                engine_warn!("error on {target}: {err:#}");
                Err(format!("{err:#}"))
            }
        };
        Msg::ItemFinished { index, result }
    }
}

/// Checkpoint files of one batch kind: `<stem>_checkpoint.json` for periodic
/// snapshots and `<stem>_partial.json` for interrupted runs.
#[derive(Debug, Clone)]
pub struct CheckpointFiles {
    writer: AtomicFileWriter,
    stem: String,
}

impl CheckpointFiles {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.into()),
            stem: stem.into(),
        }
    }

    pub fn file_name(&self, kind: CheckpointKind) -> String {
        match kind {
            CheckpointKind::Periodic => format!("{}_checkpoint.json", self.stem),
            CheckpointKind::Partial => format!("{}_partial.json", self.stem),
        }
    }

    pub fn path(&self, kind: CheckpointKind) -> PathBuf {
        self.writer.dir().join(self.file_name(kind))
    }

    pub fn write(&self, kind: CheckpointKind, checkpoint: &Checkpoint) -> Result<PathBuf, PersistError> {
        self.writer.write_json(&self.file_name(kind), checkpoint)
    }
}

/// Writes checkpoint files and, when bound to a browser session, saves the
/// session cookies alongside.
pub struct FileCheckpointSink<'a> {
    files: CheckpointFiles,
    session: Option<&'a BrowserSession>,
}

impl<'a> FileCheckpointSink<'a> {
    pub fn new(files: CheckpointFiles) -> Self {
        Self { files, session: None }
    }

    pub fn with_session(mut self, session: &'a BrowserSession) -> Self {
        self.session = Some(session);
        self
    }
}

#[async_trait]
impl CheckpointSink for FileCheckpointSink<'_> {
    async fn save(&self, kind: CheckpointKind, checkpoint: &Checkpoint) {
        match self.files.write(kind, checkpoint) {
            Ok(path) => engine_info!(
                "checkpoint {}/{} written to {}",
                checkpoint.last_index,
                checkpoint.total,
                path.display()
            ),
            Err(err) => engine_error!("failed to write checkpoint: {err}"),
        }
        if let Some(session) = self.session {
            session.persist().await;
        }
    }
}

/// Loads a checkpoint file for an operator-requested resume.
pub fn load_checkpoint(path: &Path) -> Result<Checkpoint, PersistError> {
    read_json_file(path)
}

/// A resumed run: results carried over from a checkpoint and the targets
/// still to do.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumePlan {
    pub prior: Vec<WorkItem>,
    pub remaining: Vec<String>,
}

impl ResumePlan {
    /// Targets already present in the checkpoint are not attempted again.
    pub fn new(targets: Vec<String>, checkpoint: &Checkpoint) -> Self {
        let done: HashSet<&str> = checkpoint.results.iter().map(|item| item.target.as_str()).collect();
        let remaining = targets
            .into_iter()
            .filter(|target| !done.contains(target.as_str()))
            .collect();
        Self {
            prior: checkpoint.results.clone(),
            remaining,
        }
    }

    /// Wraps `inner` so every checkpoint of the resumed run also carries the
    /// prior results and the full target count. A second interruption then
    /// resumes from everything done so far.
    pub fn checkpoint_sink<'a>(&'a self, inner: &'a dyn CheckpointSink) -> ResumeSink<'a> {
        ResumeSink {
            prior: &self.prior,
            inner,
        }
    }

    /// Prior results followed by the new run's, renumbered in order.
    pub fn merge(self, report: BatchReport) -> BatchReport {
        let total = self.prior.len() + report.summary.total;
        let results = renumbered(self.prior.into_iter().chain(report.results));
        BatchReport {
            summary: BatchSummary::from_results(total, &results),
            interrupted: report.interrupted,
            results,
        }
    }
}

/// Checkpoint sink of a resumed run; see [`ResumePlan::checkpoint_sink`].
pub struct ResumeSink<'a> {
    prior: &'a [WorkItem],
    inner: &'a dyn CheckpointSink,
}

#[async_trait]
impl CheckpointSink for ResumeSink<'_> {
    async fn save(&self, kind: CheckpointKind, checkpoint: &Checkpoint) {
        let total = self.prior.len() + checkpoint.total;
        let results = renumbered(self.prior.iter().cloned().chain(checkpoint.results.iter().cloned()));
        self.inner.save(kind, &Checkpoint::new(total, results)).await;
    }
}

fn renumbered(items: impl Iterator<Item = WorkItem>) -> Vec<WorkItem> {
    items
        .enumerate()
        .map(|(index, item)| WorkItem { index, ..item })
        .collect()
}
