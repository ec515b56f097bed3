// ABOUTME: Integration tests for the background task scheduler
// ABOUTME: Covers per-id admission, failure and panic capture, worker bounds and retention cleanup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ascend Analytics Contributors
#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use anyhow::Result;
use ascend_analytics::errors::{AppError, ErrorCode};
use ascend_analytics::tasks::{TaskScheduler, TaskSchedulerConfig, TaskStatus};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::yield_now;
use tokio::time::{advance, sleep};

const RETENTION: Duration = Duration::from_secs(3_600);

fn scheduler(workers: usize) -> TaskScheduler {
    common::init_test_logging();
    TaskScheduler::new(TaskSchedulerConfig {
        workers,
        result_retention: RETENTION,
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

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submits_admit_one() -> Result<()> {
    let scheduler = scheduler(2);
    let (release_tx, release_rx) = oneshot::channel::<()>();

    let first = scheduler.submit("X", async move {
        release_rx.await.ok();
        Ok(json!("first"))
    });
    let second = scheduler.submit("X", async { Ok(json!("second")) });
    let (first, second) = tokio::join!(first, second);

    let outcomes = [first, second];
    let admitted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(admitted, 1);
    let rejected = outcomes.iter().find_map(|outcome| outcome.as_ref().err()).unwrap();
    assert_eq!(rejected.code, ErrorCode::ResourceAlreadyExists);

    assert_eq!(scheduler.status("X").await, TaskStatus::Running);
    release_tx.send(()).ok();
    assert_eq!(wait_until_finished(&scheduler, "X").await, TaskStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn test_finished_id_stays_taken_until_retention_expires() -> Result<()> {
    let scheduler = scheduler(1);
    scheduler.submit("once", async { Ok(json!(1)) }).await?;
    wait_until_finished(&scheduler, "once").await;

    let error = scheduler
        .submit("once", async { Ok(json!(2)) })
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceAlreadyExists);
    assert_eq!(scheduler.result("once").await, Some(json!(1)));
    Ok(())
}

#[tokio::test]
async fn test_error_message_surfaces_in_status() -> Result<()> {
    let scheduler = scheduler(1);
    scheduler
        .submit("fails", async {
            Err(AppError::invalid_input("window must be positive"))
        })
        .await?;

    let status = wait_until_finished(&scheduler, "fails").await;
    assert_eq!(
        status,
        TaskStatus::Error {
            message: "window must be positive".to_owned()
        }
    );
    assert!(scheduler.result("fails").await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_panic_is_captured_as_error() -> Result<()> {
    let scheduler = scheduler(1);
    scheduler
        .submit("boom", async {
            if scheduler_should_panic() {
                panic!("model exploded");
            }
            Ok(json!(null))
        })
        .await?;

    let TaskStatus::Error { message } = wait_until_finished(&scheduler, "boom").await else {
        panic!("a panicking task must end in error");
    };
    assert_eq!(message, "Task panicked: model exploded");

    // The worker survives the panic
    scheduler.submit("after", async { Ok(json!(true)) }).await?;
    assert_eq!(
        wait_until_finished(&scheduler, "after").await,
        TaskStatus::Completed
    );
    Ok(())
}

const fn scheduler_should_panic() -> bool {
    true
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_count_bounds_concurrency() -> Result<()> {
    let scheduler = scheduler(2);
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let ids: Vec<String> = (0..6).map(|i| format!("job-{i}")).collect();
    for id in &ids {
        let running = running.clone();
        let peak = peak.clone();
        scheduler
            .submit(id, async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(20)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(json!(now))
            })
            .await?;
    }

    for id in &ids {
        assert_eq!(wait_until_finished(&scheduler, id).await, TaskStatus::Completed);
    }
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak >= 1);
    assert!(peak <= 2, "peak concurrency was {peak}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_drops_handles_then_expired_results() -> Result<()> {
    let scheduler = scheduler(1);
    scheduler.submit("done", async { Ok(json!("ok")) }).await?;
    wait_until_finished(&scheduler, "done").await;

    let mut handles_removed = 0;
    while scheduler.active_count().await > 0 {
        handles_removed += scheduler.cleanup_finished().await.handles_removed;
        yield_now().await;
    }
    assert_eq!(handles_removed, 1);
    assert_eq!(scheduler.status("done").await, TaskStatus::Completed);

    let early = scheduler.cleanup_finished().await;
    assert_eq!(early.results_expired, 0);

    advance(RETENTION + Duration::from_secs(1)).await;
    let report = scheduler.cleanup_finished().await;
    assert_eq!(report.results_expired, 1);
    assert_eq!(scheduler.status("done").await, TaskStatus::NotFound);

    scheduler.submit("done", async { Ok(json!("again")) }).await?;
    Ok(())
}
