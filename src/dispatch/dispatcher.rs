//! Concurrent batch dispatcher.
//!
//! Every task runs on its own tokio task and reports exactly one
//! [`TaskOutcome`] through an mpsc channel. The dispatcher drains the
//! channel and joins every handle before returning, so callers never see a
//! partial batch.

use crate::agent::Agent;
use crate::models::{DispatchBatch, Outcome, TaskOutcome};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One delivery request: an agent and where it should go.
#[derive(Debug, Clone)]
pub struct Task {
    pub agent: Arc<Agent>,
    pub destination: String,
}

impl Task {
    pub fn new(agent: Arc<Agent>, destination: impl Into<String>) -> Self {
        Self {
            agent,
            destination: destination.into(),
        }
    }
}

/// Dispatcher options.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Show a progress bar on stderr while the batch runs.
    pub show_progress: bool,
}

/// Runs batches of delivery tasks concurrently.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(options: DispatchOptions) -> Self {
        Self { options }
    }

    /// Attempt every task concurrently and collect one outcome per task.
    ///
    /// Agent failures are recorded as [`Outcome::Failed`] and never affect
    /// sibling tasks. Must be called from within a tokio runtime.
    pub async fn dispatch_batch(&self, tasks: Vec<Task>) -> DispatchBatch {
        self.run_batch(tasks, run_task).await
    }

    /// Fan `tasks` out through `attempt`, one spawned unit per task.
    async fn run_batch<F, Fut>(&self, tasks: Vec<Task>, attempt: F) -> DispatchBatch
    where
        F: Fn(usize, Task) -> Fut,
        Fut: Future<Output = TaskOutcome> + Send + 'static,
    {
        let start = Instant::now();
        let total = tasks.len();
        info!("Dispatching {} tasks", total);

        let progress = self.progress_bar(total);

        // Kept aside so a unit that dies before reporting can still be accounted for.
        let mut pending = Vec::with_capacity(total);

        let (tx, mut rx) = mpsc::unbounded_channel::<TaskOutcome>();
        let mut handles = Vec::with_capacity(total);

        for (task_index, task) in tasks.into_iter().enumerate() {
            pending.push((task_index, task.agent.clone(), task.destination.clone()));
            let tx = tx.clone();
            let attempt = attempt(task_index, task);
            handles.push(tokio::spawn(async move {
                let outcome = attempt.await;
                // The receiver lives until every sender is gone.
                let _ = tx.send(outcome);
            }));
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(total);
        let mut reported = HashSet::with_capacity(total);

        while let Some(outcome) = rx.recv().await {
            debug!(
                "Task {} ({} -> {}) finished: {}",
                outcome.task_index, outcome.agent_id, outcome.destination, outcome.outcome
            );
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            reported.insert(outcome.task_index);
            outcomes.push(outcome);
        }

        for (result, (task_index, agent, destination)) in
            join_all(handles).await.into_iter().zip(pending)
        {
            if let Err(e) = result {
                if reported.contains(&task_index) {
                    continue;
                }
                warn!(
                    "Task {} ({} -> {}) terminated abnormally: {}",
                    task_index,
                    agent.id(),
                    destination,
                    e
                );
                outcomes.push(TaskOutcome {
                    task_index,
                    agent_id: agent.id().to_string(),
                    agent_kind: agent.kind(),
                    destination,
                    outcome: Outcome::Failed {
                        reason: format!("delivery attempt terminated abnormally: {}", e),
                    },
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("Dispatch complete");
        }

        let batch = DispatchBatch {
            outcomes,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Batch complete: {} outcomes in {} ms",
            batch.len(),
            batch.duration_ms
        );
        batch
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if !self.options.show_progress || total == 0 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Some(pb)
    }
}

/// Run one delivery attempt and turn its result into a tagged outcome.
async fn run_task(task_index: usize, task: Task) -> TaskOutcome {
    let started = Instant::now();
    let result = task.agent.attempt_delivery(&task.destination).await;

    let outcome = match result {
        Ok(message) => Outcome::Delivered { message },
        Err(e) => {
            warn!(
                "{} {} could not deliver to {}: {}",
                task.agent.kind().vehicle(),
                task.agent.id(),
                task.destination,
                e
            );
            Outcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    TaskOutcome {
        task_index,
        agent_id: task.agent.id().to_string(),
        agent_kind: task.agent.kind(),
        destination: task.destination,
        outcome,
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentKind, TransitTime};
    use std::time::Duration;

    fn instant(agent: Agent) -> Arc<Agent> {
        Arc::new(agent.with_transit(TransitTime::INSTANT))
    }

    fn fixed(agent: Agent, millis: u64) -> Arc<Agent> {
        Arc::new(agent.with_transit(TransitTime::Fixed(Duration::from_millis(millis))))
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let batch = Dispatcher::default().dispatch_batch(Vec::new()).await;
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_one_outcome_per_task() {
        let truck = instant(Agent::ground("A8U5", 5));
        let drone = instant(Agent::air("1234N", 15));
        let boat = instant(Agent::sea("6TD4G", "Clear"));

        let mut tasks = Vec::new();
        for i in 0..30 {
            let agent = match i % 3 {
                0 => truck.clone(),
                1 => drone.clone(),
                _ => boat.clone(),
            };
            tasks.push(Task::new(agent, format!("City {}", i)));
        }

        let batch = Dispatcher::default().dispatch_batch(tasks).await;

        assert_eq!(batch.len(), 30);
        let indices: HashSet<usize> = batch.outcomes.iter().map(|o| o.task_index).collect();
        assert_eq!(indices, (0..30).collect::<HashSet<_>>());

        for o in &batch.outcomes {
            assert_eq!(o.destination, format!("City {}", o.task_index));
            assert_eq!(o.outcome.is_delivered(), o.agent_kind != AgentKind::Air);
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_siblings() {
        let tasks = vec![
            Task::new(instant(Agent::sea("S1", "Storm")), "Paris"),
            Task::new(instant(Agent::sea("S2", "Clear")), "Paris"),
            Task::new(instant(Agent::air("A1", 15)), "Los Angeles"),
            Task::new(instant(Agent::air("A2", 100)), "Los Angeles"),
        ];

        let batch = Dispatcher::default().dispatch_batch(tasks).await;
        assert_eq!(batch.len(), 4);

        let failed = batch.outcome_for(0).unwrap();
        assert!(failed.outcome.text().contains("unsafe condition"));

        let delivered = batch.outcome_for(1).unwrap();
        assert_eq!(
            delivered.outcome,
            Outcome::Delivered {
                message: "Boat S2 delivered the package to Paris".to_string()
            }
        );

        let failed = batch.outcome_for(2).unwrap();
        assert!(failed.outcome.text().contains("insufficient energy"));

        let delivered = batch.outcome_for(3).unwrap();
        assert!(delivered.outcome.text().contains("A2"));
        assert!(delivered.outcome.text().contains("Los Angeles"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_tasks_run_in_parallel() {
        let tasks = vec![
            Task::new(fixed(Agent::ground("G", 1), 100), "One"),
            Task::new(fixed(Agent::air("A", 90), 300), "Three"),
            Task::new(fixed(Agent::sea("S", "Clear"), 500), "Five"),
        ];

        let start = Instant::now();
        let batch = Dispatcher::default().dispatch_batch(tasks).await;
        let elapsed = start.elapsed();

        assert_eq!(batch.len(), 3);
        assert!(elapsed >= Duration::from_millis(500));
        // Sequential execution would take 900 ms.
        assert!(elapsed < Duration::from_millis(850), "took {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_time_is_max_not_sum() {
        let tasks = vec![
            Task::new(fixed(Agent::ground("G", 1), 1_000), "One"),
            Task::new(fixed(Agent::air("A", 90), 3_000), "Three"),
            Task::new(fixed(Agent::sea("S", "Clear"), 5_000), "Five"),
        ];

        let start = tokio::time::Instant::now();
        let batch = Dispatcher::default().dispatch_batch(tasks).await;
        let elapsed = start.elapsed();

        assert_eq!(batch.len(), 3);
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_partial_batch() {
        let tasks = vec![
            Task::new(fixed(Agent::ground("fast", 1), 10), "Near"),
            Task::new(fixed(Agent::ground("slow", 1), 60_000), "Far"),
        ];

        let batch = Dispatcher::default().dispatch_batch(tasks).await;

        assert_eq!(batch.len(), 2);
        assert!(batch.outcomes.iter().all(|o| o.outcome.is_delivered()));
        // Arrival order: the fast task reports first.
        assert_eq!(batch.outcomes[0].agent_id, "fast");
        assert_eq!(batch.outcomes[1].agent_id, "slow");
    }

    #[tokio::test]
    async fn test_panicking_unit_still_yields_one_outcome() {
        let tasks = vec![
            Task::new(instant(Agent::ground("G1", 5)), "Lyon"),
            Task::new(instant(Agent::air("A1", 80)), "Nantes"),
            Task::new(instant(Agent::sea("S1", "Clear")), "Brest"),
        ];

        let batch = Dispatcher::default()
            .run_batch(tasks, |task_index, task| async move {
                if task_index == 1 {
                    panic!("rotor failure");
                }
                run_task(task_index, task).await
            })
            .await;

        assert_eq!(batch.len(), 3);
        let indices: HashSet<usize> = batch.outcomes.iter().map(|o| o.task_index).collect();
        assert_eq!(indices, (0..3).collect::<HashSet<_>>());

        let crashed = batch.outcome_for(1).unwrap();
        assert_eq!(crashed.agent_id, "A1");
        assert_eq!(crashed.destination, "Nantes");
        assert!(crashed
            .outcome
            .text()
            .starts_with("delivery attempt terminated abnormally"));

        assert!(batch.outcome_for(0).unwrap().outcome.is_delivered());
        assert!(batch.outcome_for(2).unwrap().outcome.is_delivered());
    }

    #[test]
    fn test_dispatch_with_blocking_runtime() {
        let tasks = vec![Task::new(instant(Agent::air("A", 50)), "Lyon")];
        let batch = tokio_test::block_on(Dispatcher::default().dispatch_batch(tasks));
        assert_eq!(batch.len(), 1);
    }
}
