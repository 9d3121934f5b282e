//! Outcome aggregation and statistics.
//!
//! This module provides utilities for grouping the outcomes of a batch and
//! computing statistics over them.

use crate::agent::AgentKind;
use crate::models::{BatchSummary, TaskOutcome};
use std::collections::HashMap;

/// Put outcomes back in submission order.
pub fn sort_by_task(outcomes: &mut [TaskOutcome]) {
    outcomes.sort_by_key(|o| o.task_index);
}

/// Group outcomes by agent id, each group in submission order.
pub fn group_by_agent(outcomes: &[TaskOutcome]) -> HashMap<String, Vec<TaskOutcome>> {
    let mut grouped: HashMap<String, Vec<TaskOutcome>> = HashMap::new();

    for outcome in outcomes {
        grouped
            .entry(outcome.agent_id.clone())
            .or_default()
            .push(outcome.clone());
    }

    for group in grouped.values_mut() {
        sort_by_task(group);
    }

    grouped
}

/// Group outcomes by transport kind.
pub fn group_by_kind(outcomes: &[TaskOutcome]) -> HashMap<AgentKind, Vec<TaskOutcome>> {
    let mut grouped: HashMap<AgentKind, Vec<TaskOutcome>> = HashMap::new();

    for outcome in outcomes {
        grouped
            .entry(outcome.agent_kind)
            .or_default()
            .push(outcome.clone());
    }

    grouped
}

/// Failed outcomes only, in submission order.
pub fn failures(outcomes: &[TaskOutcome]) -> Vec<&TaskOutcome> {
    let mut failed: Vec<_> = outcomes
        .iter()
        .filter(|o| !o.outcome.is_delivered())
        .collect();
    failed.sort_by_key(|o| o.task_index);
    failed
}

/// Share of delivered tasks, between 0.0 and 1.0. An empty batch counts as 1.0.
pub fn success_rate(summary: &BatchSummary) -> f64 {
    if summary.total == 0 {
        return 1.0;
    }
    summary.delivered as f64 / summary.total as f64
}

/// The `n` slowest successful deliveries.
pub fn slowest_deliveries(outcomes: &[TaskOutcome], n: usize) -> Vec<&TaskOutcome> {
    let mut delivered: Vec<_> = outcomes
        .iter()
        .filter(|o| o.outcome.is_delivered())
        .collect();

    delivered.sort_by_key(|o| std::cmp::Reverse(o.elapsed_ms));
    delivered.truncate(n);
    delivered
}
