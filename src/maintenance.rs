// ABOUTME: Periodic maintenance sweeps on the tokio runtime with retry backoff and clean shutdown
// ABOUTME: Drives cache expiry purges and task registry cleanup independent of request traffic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors

use crate::config::SweepSettings;
use crate::errors::AppResult;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);
const MIN_RETRY_PERIOD: Duration = Duration::from_secs(1);

/// Cadence of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSchedule {
    /// Time between successful runs
    pub interval: Duration,
    /// Time before retrying after a failed run
    pub retry_interval: Duration,
}

impl SweepSchedule {
    /// Schedule running every `interval_secs` with the configured retry delay
    #[must_use]
    pub const fn from_settings(interval_secs: u64, settings: &SweepSettings) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            retry_interval: Duration::from_secs(settings.retry_secs),
        }
    }
}

/// Running sweep; stops on [`SweepHandle::shutdown`] or when dropped
pub struct SweepHandle {
    name: &'static str,
    shutdown_tx: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Sweep name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Stop the loop and wait for the current iteration to finish
    pub async fn shutdown(mut self) {
        if let Err(e) = self.shutdown_tx.send(()).await {
            debug!(sweep = self.name, error = ?e, "Sweep already stopped");
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(sweep = self.name, error = %e, "Sweep task ended abnormally");
            }
        }
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            if let Err(e) = self.shutdown_tx.try_send(()) {
                debug!(sweep = self.name, error = ?e, "Sweep shutdown signal send failed (channel likely closed)");
            }
        }
    }
}

/// Run `job` now and then on `schedule` until the handle stops it
///
/// A failed run is logged and retried after `retry_interval`, but never
/// sooner than one second; the loop never exits on its own.
pub fn spawn_periodic<F, Fut>(name: &'static str, schedule: SweepSchedule, mut job: F) -> SweepHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<usize>> + Send + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    let task = tokio::spawn(async move {
        // tokio intervals reject a zero period
        let mut ticker = interval(schedule.interval.max(MIN_SWEEP_PERIOD));
        let retry_interval = schedule.retry_interval.max(MIN_RETRY_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match job().await {
                        Ok(0) => debug!(sweep = name, "Sweep found nothing to remove"),
                        Ok(removed) => info!(sweep = name, removed, "Sweep completed"),
                        Err(e) => {
                            error!(
                                sweep = name,
                                error = %e,
                                retry_in_secs = retry_interval.as_secs(),
                                "Sweep failed, retrying"
                            );
                            ticker.reset_after(retry_interval);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    debug!(sweep = name, "Sweep received shutdown signal");
                    break;
                }
            }
        }
    });

    info!(
        sweep = name,
        interval_secs = schedule.interval.as_secs(),
        "Periodic sweep started"
    );

    SweepHandle {
        name,
        shutdown_tx,
        task: Some(task),
    }
}
