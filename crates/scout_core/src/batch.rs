use std::time::Duration;

use crate::{ActionOutcome, BatchReport, BatchSummary, Checkpoint, CheckpointKind, ItemIndex, WorkItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Interrupted,
}

/// Progress of one sequential batch run over a fixed list of targets.
///
/// Items before `next` are terminal, items from `next` on are pending, so the
/// attempted results are always a prefix of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchState {
    items: Vec<WorkItem>,
    next: usize,
    phase: BatchPhase,
    delay: Duration,
    checkpoint_every: usize,
}

impl BatchState {
    /// `checkpoint_every == 0` disables periodic checkpoints.
    pub fn new(targets: Vec<String>, delay: Duration, checkpoint_every: usize) -> Self {
        let items = targets
            .into_iter()
            .enumerate()
            .map(|(index, target)| WorkItem::pending(index, target))
            .collect();
        Self {
            items,
            next: 0,
            phase: BatchPhase::Idle,
            delay,
            checkpoint_every,
        }
    }

    pub fn phase(&self) -> BatchPhase {
        self.phase
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn attempted(&self) -> usize {
        self.next
    }

    pub fn results(&self) -> &[WorkItem] {
        &self.items[..self.next]
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.total(), self.results().to_vec())
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_results(self.total(), self.results())
    }

    pub fn into_report(mut self) -> BatchReport {
        let summary = self.summary();
        self.items.truncate(self.next);
        BatchReport {
            summary,
            interrupted: self.phase == BatchPhase::Interrupted,
            results: self.items,
        }
    }

    fn is_due_for_checkpoint(&self) -> bool {
        self.checkpoint_every > 0 && self.next % self.checkpoint_every == 0
    }

    fn process_next(&self) -> Effect {
        let item = &self.items[self.next];
        Effect::ProcessItem {
            index: item.index,
            target: item.target.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Begin processing the first item.
    Start,
    /// The action for `index` returned; `Err` carries the error's message.
    ItemFinished {
        index: ItemIndex,
        result: Result<ActionOutcome, String>,
    },
    /// Operator cancelled the run. Only observed between items.
    CancelRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ProcessItem { index: ItemIndex, target: String },
    /// Pause before the next item; never emitted after the last one.
    Wait(Duration),
    SaveCheckpoint {
        kind: CheckpointKind,
        checkpoint: Checkpoint,
    },
    Finished {
        summary: BatchSummary,
        interrupted: bool,
    },
}

/// Pure update function: applies a message to the batch and returns the effects to run.
pub fn update(mut state: BatchState, msg: Msg) -> (BatchState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start => {
            if state.phase != BatchPhase::Idle {
                return (state, Vec::new());
            }
            if state.items.is_empty() {
                state.phase = BatchPhase::Completed;
                vec![Effect::Finished {
                    summary: state.summary(),
                    interrupted: false,
                }]
            } else {
                state.phase = BatchPhase::Running;
                vec![state.process_next()]
            }
        }
        Msg::ItemFinished { index, result } => {
            // Stale or repeated completions never touch the ledger.
            if state.phase != BatchPhase::Running || index != state.next {
                return (state, Vec::new());
            }
            state.items[index].record(result);
            state.next += 1;

            let mut effects = Vec::with_capacity(3);
            if state.is_due_for_checkpoint() {
                effects.push(Effect::SaveCheckpoint {
                    kind: CheckpointKind::Periodic,
                    checkpoint: state.checkpoint(),
                });
            }
            if state.next < state.items.len() {
                effects.push(Effect::Wait(state.delay));
                effects.push(state.process_next());
            } else {
                state.phase = BatchPhase::Completed;
                effects.push(Effect::Finished {
                    summary: state.summary(),
                    interrupted: false,
                });
            }
            effects
        }
        Msg::CancelRequested => match state.phase {
            BatchPhase::Idle | BatchPhase::Running => {
                state.phase = BatchPhase::Interrupted;
                vec![
                    Effect::SaveCheckpoint {
                        kind: CheckpointKind::Partial,
                        checkpoint: state.checkpoint(),
                    },
                    Effect::Finished {
                        summary: state.summary(),
                        interrupted: true,
                    },
                ]
            }
            BatchPhase::Completed | BatchPhase::Interrupted => Vec::new(),
        },
    };

    (state, effects)
}
