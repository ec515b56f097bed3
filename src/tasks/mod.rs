// ABOUTME: Bounded background task scheduler with per-id admission control and result retention
// ABOUTME: Runs expensive analyses on a small worker pool and exposes status and result polling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

//! # Background Tasks
//!
//! `TaskScheduler` admits at most one task per id. A task runs once a worker
//! permit is free and transitions to completed or error exactly once. Finished
//! handles are dropped by [`TaskScheduler::cleanup_finished`]; outcomes are kept
//! until the retention period has passed, and the id stays taken until then.

/// Expensive analysis payloads
pub mod expensive;

pub use expensive::ExpensiveAnalysis;

use crate::config::AnalyticsConfig;
use crate::errors::{AppError, AppResult};
use crate::logging::AnalyticsLogger;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Observable state of a task id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for or holding a worker
    Running,
    /// Finished with a result
    Completed,
    /// Failed or panicked
    Error {
        /// Failure message, without a backtrace
        message: String,
    },
    /// Never submitted, or already cleaned up
    NotFound,
}

/// Counts removed by one cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCleanupReport {
    /// Finished handles dropped from the active set
    pub handles_removed: usize,
    /// Outcomes older than the retention period
    pub results_expired: usize,
}

impl TaskCleanupReport {
    /// Total entries removed
    #[must_use]
    pub const fn total(&self) -> usize {
        self.handles_removed + self.results_expired
    }
}

/// Scheduler tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSchedulerConfig {
    /// Concurrent worker count
    pub workers: usize,
    /// How long outcomes stay retrievable after finishing
    pub result_retention: Duration,
}

impl From<&AnalyticsConfig> for TaskSchedulerConfig {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            workers: config.tasks.workers,
            result_retention: Duration::from_secs(config.tasks.result_retention_secs),
        }
    }
}

#[derive(Debug, Clone)]
enum TaskOutcome {
    Completed(Value),
    Failed(String),
}

#[derive(Debug)]
struct FinishedTask {
    outcome: TaskOutcome,
    finished_at: Instant,
}

#[derive(Default)]
struct TaskRegistry {
    active: HashMap<String, JoinHandle<()>>,
    finished: HashMap<String, FinishedTask>,
}

impl TaskRegistry {
    fn is_taken(&self, task_id: &str) -> bool {
        self.active.contains_key(task_id) || self.finished.contains_key(task_id)
    }

    fn status(&self, task_id: &str) -> TaskStatus {
        match self.finished.get(task_id).map(|task| &task.outcome) {
            Some(TaskOutcome::Completed(_)) => TaskStatus::Completed,
            Some(TaskOutcome::Failed(message)) => TaskStatus::Error {
                message: message.clone(),
            },
            None if self.active.contains_key(task_id) => TaskStatus::Running,
            None => TaskStatus::NotFound,
        }
    }
}

/// Small fixed-size worker pool keyed by task id
#[derive(Clone)]
pub struct TaskScheduler {
    registry: Arc<Mutex<TaskRegistry>>,
    permits: Arc<Semaphore>,
    result_retention: Duration,
}

impl TaskScheduler {
    /// Create a scheduler; a zero worker count is raised to one
    #[must_use]
    pub fn new(config: TaskSchedulerConfig) -> Self {
        Self {
            registry: Arc::new(Mutex::new(TaskRegistry::default())),
            permits: Arc::new(Semaphore::new(config.workers.max(1))),
            result_retention: config.result_retention,
        }
    }

    /// Admit `work` under `task_id` and return immediately
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the id is running or still holds an
    /// unexpired outcome
    pub async fn submit<F>(&self, task_id: &str, work: F) -> AppResult<()>
    where
        F: Future<Output = AppResult<Value>> + Send + 'static,
    {
        let mut registry = self.registry.lock().await;
        if registry.is_taken(task_id) {
            return Err(
                AppError::conflict(format!("Task {task_id} is already running or finished"))
                    .with_resource_id(task_id),
            );
        }

        let handle = tokio::spawn(Self::run(
            task_id.to_owned(),
            work,
            self.registry.clone(),
            self.permits.clone(),
        ));
        registry.active.insert(task_id.to_owned(), handle);
        drop(registry);

        AnalyticsLogger::log_task_event(task_id, "submitted", None);
        Ok(())
    }

    async fn run<F>(
        task_id: String,
        work: F,
        registry: Arc<Mutex<TaskRegistry>>,
        permits: Arc<Semaphore>,
    ) where
        F: Future<Output = AppResult<Value>> + Send + 'static,
    {
        let outcome = match permits.acquire_owned().await {
            Ok(_permit) => {
                debug!(task_id = %task_id, "Task acquired a worker");
                // Inner spawn isolates panics from the worker
                match tokio::spawn(work).await {
                    Ok(Ok(value)) => TaskOutcome::Completed(value),
                    Ok(Err(error)) => TaskOutcome::Failed(error.message),
                    Err(join_error) if join_error.is_panic() => {
                        TaskOutcome::Failed(panic_message(join_error.into_panic().as_ref()))
                    }
                    Err(join_error) => TaskOutcome::Failed(join_error.to_string()),
                }
            }
            Err(_) => TaskOutcome::Failed("Task scheduler is shut down".to_owned()),
        };

        match &outcome {
            TaskOutcome::Completed(_) => {
                AnalyticsLogger::log_task_event(&task_id, "completed", None);
            }
            TaskOutcome::Failed(message) => {
                warn!(task_id = %task_id, error = %message, "Background task failed");
                AnalyticsLogger::log_task_event(&task_id, "failed", Some(message.as_str()));
            }
        }

        registry.lock().await.finished.insert(
            task_id,
            FinishedTask {
                outcome,
                finished_at: Instant::now(),
            },
        );
    }

    /// Current state of `task_id`
    pub async fn status(&self, task_id: &str) -> TaskStatus {
        self.registry.lock().await.status(task_id)
    }

    /// Result payload once completed; `None` while running, after an error,
    /// or for unknown ids
    pub async fn result(&self, task_id: &str) -> Option<Value> {
        let registry = self.registry.lock().await;
        match registry.finished.get(task_id).map(|task| &task.outcome) {
            Some(TaskOutcome::Completed(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Number of admitted tasks whose handle has not been cleaned up
    pub async fn active_count(&self) -> usize {
        self.registry.lock().await.active.len()
    }

    /// Drop finished handles and outcomes past the retention period
    pub async fn cleanup_finished(&self) -> TaskCleanupReport {
        let mut registry = self.registry.lock().await;

        let before_active = registry.active.len();
        registry.active.retain(|_, handle| !handle.is_finished());
        let handles_removed = before_active - registry.active.len();

        let retention = self.result_retention;
        let before_finished = registry.finished.len();
        registry
            .finished
            .retain(|_, task| task.finished_at.elapsed() < retention);
        let results_expired = before_finished - registry.finished.len();
        drop(registry);

        let report = TaskCleanupReport {
            handles_removed,
            results_expired,
        };
        if report.total() > 0 {
            debug!(
                handles_removed,
                results_expired, "Background task registry cleaned up"
            );
        }
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_owned());
    format!("Task panicked: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::task::yield_now;

    fn scheduler() -> TaskScheduler {
        TaskScheduler::new(TaskSchedulerConfig {
            workers: 2,
            result_retention: Duration::from_secs(60),
        })
    }

    async fn wait_until_finished(scheduler: &TaskScheduler, task_id: &str) -> TaskStatus {
        loop {
            let status = scheduler.status(task_id).await;
            if status != TaskStatus::Running {
                return status;
            }
            yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let scheduler = scheduler();
        assert_eq!(scheduler.status("missing").await, TaskStatus::NotFound);
        assert!(scheduler.result("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_completed_task_result() {
        let scheduler = scheduler();
        scheduler
            .submit("ok", async { Ok(json!({"answer": 42})) })
            .await
            .unwrap();

        assert_eq!(wait_until_finished(&scheduler, "ok").await, TaskStatus::Completed);
        assert_eq!(scheduler.result("ok").await, Some(json!({"answer": 42})));
    }

    #[test]
    fn test_panic_message_extracts_str() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "Task panicked: boom");
    }
}
