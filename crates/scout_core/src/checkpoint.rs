use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ItemStatus, WorkItem};

/// Periodic snapshots are written every N items; partial ones only when a
/// run is interrupted. They share a shape and differ by destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointKind {
    Periodic,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub last_index: usize,
    pub total: usize,
    pub results: Vec<WorkItem>,
}

impl Checkpoint {
    pub fn new(total: usize, results: Vec<WorkItem>) -> Self {
        Self {
            last_index: results.len(),
            total,
            results,
        }
    }

    /// `last_index <= total` and one result per attempted item.
    pub fn is_consistent(&self) -> bool {
        self.last_index <= self.total && self.results.len() == self.last_index
    }
}

/// Per-status counts printed and stored at the end of every batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub already_satisfied: usize,
    pub failed: usize,
    pub errors: usize,
}

impl BatchSummary {
    pub fn from_results(total: usize, results: &[WorkItem]) -> Self {
        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };
        for item in results {
            match item.status {
                ItemStatus::Pending => continue,
                ItemStatus::Succeeded => summary.succeeded += 1,
                ItemStatus::AlreadySatisfied => summary.already_satisfied += 1,
                ItemStatus::Failed => summary.failed += 1,
                ItemStatus::Error => summary.errors += 1,
            }
            summary.attempted += 1;
        }
        summary
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} attempted: {} succeeded, {} already satisfied, {} failed, {} errors",
            self.attempted,
            self.total,
            self.succeeded,
            self.already_satisfied,
            self.failed,
            self.errors
        )
    }
}

/// Final result of a batch run, interrupted or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub interrupted: bool,
    pub results: Vec<WorkItem>,
}
