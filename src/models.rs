//! Data models for dispatch results.
//!
//! This module contains the outcome types produced by the dispatcher and
//! the report structures built from them.

use crate::agent::AgentKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Terminal result of a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The package arrived.
    Delivered { message: String },
    /// The delivery did not happen.
    Failed { reason: String },
}

impl Outcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Outcome::Delivered { .. })
    }

    /// The success message or the failure reason.
    pub fn text(&self) -> &str {
        match self {
            Outcome::Delivered { message } => message,
            Outcome::Failed { reason } => reason,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Delivered { message } => write!(f, "Success: {}", message),
            Outcome::Failed { reason } => write!(f, "Error: {}", reason),
        }
    }
}

/// An outcome tagged with the task that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Position of the task in the submitted sequence.
    pub task_index: usize,
    pub agent_id: String,
    pub agent_kind: AgentKind,
    pub destination: String,
    pub outcome: Outcome,
    /// Wall time spent on the attempt, in milliseconds.
    pub elapsed_ms: u64,
}

/// Every outcome of one dispatched set of tasks.
///
/// Outcomes are stored in arrival order; use `task_index` to map them back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchBatch {
    pub outcomes: Vec<TaskOutcome>,
    /// Wall time of the whole batch, in milliseconds.
    pub duration_ms: u64,
}

impl DispatchBatch {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Look up the outcome of the task submitted at `index`.
    #[cfg(test)]
    pub fn outcome_for(&self, index: usize) -> Option<&TaskOutcome> {
        self.outcomes.iter().find(|o| o.task_index == index)
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.outcome.is_delivered())
    }

    pub fn into_outcomes(self) -> Vec<TaskOutcome> {
        self.outcomes
    }
}

/// Counts over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Delivered/failed counts per transport kind.
    pub by_kind: HashMap<AgentKind, KindCounts>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub delivered: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Creates a summary from a list of outcomes.
    pub fn from_outcomes(outcomes: &[TaskOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };

        for o in outcomes {
            let counts = summary.by_kind.entry(o.agent_kind).or_default();
            if o.outcome.is_delivered() {
                summary.delivered += 1;
                counts.delivered += 1;
            } else {
                summary.failed += 1;
                counts.failed += 1;
            }
        }

        summary
    }
}

/// Status line of one agent, captured for the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub agent_id: String,
    pub agent_kind: AgentKind,
    pub status: String,
}

/// Metadata about a dispatch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub dispatched_at: DateTime<Utc>,
    pub agents: usize,
    pub tasks: usize,
    pub delivered: usize,
    pub failed: usize,
    pub duration_seconds: f64,
}

/// The complete dispatch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub fleet: Vec<AgentStatus>,
    pub summary: BatchSummary,
    pub outcomes: Vec<TaskOutcome>,
}

impl Report {
    /// Assemble a report; outcomes are put back in submission order.
    pub fn new(
        dispatched_at: DateTime<Utc>,
        fleet: Vec<AgentStatus>,
        batch: DispatchBatch,
    ) -> Self {
        let duration_seconds = batch.duration_ms as f64 / 1000.0;
        let mut outcomes = batch.into_outcomes();
        crate::analysis::sort_by_task(&mut outcomes);
        let summary = BatchSummary::from_outcomes(&outcomes);

        Self {
            metadata: ReportMetadata {
                dispatched_at,
                agents: fleet.len(),
                tasks: summary.total,
                delivered: summary.delivered,
                failed: summary.failed,
                duration_seconds,
            },
            fleet,
            summary,
            outcomes,
        }
    }
}
