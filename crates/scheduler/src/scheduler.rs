//! Periodic publication sweep.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use noticeboard_common::config::SchedulerSettings;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Error type returned by scheduled jobs.
pub type JobError = Box<dyn std::error::Error + Send + Sync>;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between publication sweeps (default: 1 minute).
    pub publish_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            publish_interval: Duration::from_secs(60),
        }
    }
}

impl From<&SchedulerSettings> for SchedulerConfig {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            // A zero period would make `interval` panic.
            publish_interval: Duration::from_secs(settings.publish_interval_secs.max(1)),
        }
    }
}

/// Scheduler state for tracking job runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerState {
    pub last_publish_run: Option<DateTime<Utc>>,
    /// Notices published by the most recent successful run.
    pub last_published: u64,
    pub runs: u64,
    /// Runs that returned an error or panicked.
    pub failures: u64,
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Publish every notice that is due and notify students.
    ///
    /// Returns the number of notices published.
    async fn publish_due_notices(&self) -> Result<u64, JobError>;
}

/// Handle to a running scheduler.
pub struct SchedulerHandle {
    task: JoinHandle<()>,
    state: Arc<RwLock<SchedulerState>>,
}

impl SchedulerHandle {
    /// Snapshot of the run bookkeeping.
    pub async fn state(&self) -> SchedulerState {
        self.state.read().await.clone()
    }

    /// Stop scheduling new runs. A sweep in progress is dropped.
    pub fn abort(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Run the scheduler with the given configuration and executor.
///
/// The first sweep starts immediately. Each run completes before the next
/// tick is awaited, so runs never overlap; ticks missed while a run was in
/// progress are skipped. Every run executes in its own task, so an error
/// or a panic is logged and the loop keeps going.
pub fn run_scheduler<E: JobExecutor + 'static>(
    config: SchedulerConfig,
    executor: Arc<E>,
) -> SchedulerHandle {
    let state = Arc::new(RwLock::new(SchedulerState::default()));
    let task_state = Arc::clone(&state);

    let task = tokio::spawn(async move {
        let mut ticker = interval(config.publish_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let run_executor = Arc::clone(&executor);
            let outcome =
                tokio::spawn(async move { run_executor.publish_due_notices().await }).await;

            let mut state = task_state.write().await;
            state.runs += 1;
            state.last_publish_run = Some(Utc::now());

            match outcome {
                Ok(Ok(count)) => {
                    state.last_published = count;
                    if count > 0 {
                        tracing::info!(count, "Published due notices");
                    }
                }
                Ok(Err(e)) => {
                    state.failures += 1;
                    tracing::error!(error = %e, "Failed to publish due notices");
                }
                Err(e) => {
                    state.failures += 1;
                    tracing::error!(error = %e, panicked = e.is_panic(), "Publication sweep aborted");
                }
            }
        }
    });

    SchedulerHandle { task, state }
}
