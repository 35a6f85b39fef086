/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use acton_hive::prelude::*;
use tokio::sync::oneshot;

use crate::setup::{initialize_tracing, test_config};

mod setup;

/// Starting a second run in a scope cancels the first; the second stays live.
#[tokio::test]
async fn test_latest_run_wins() {
    initialize_tracing();
    let manager = RunManager::new();
    let first = manager.start_new_run("s1");
    assert!(!first.is_cancelled());

    let second = manager.start_new_run("s1");
    assert!(first.is_cancelled());
    assert!(!second.is_cancelled());
    assert_ne!(first.run_id(), second.run_id());
    assert_eq!(
        manager.get_current_run("s1").map(|run| run.run_id().to_string()),
        Some(second.run_id().to_string())
    );
}

/// Scopes are independent of each other.
#[tokio::test]
async fn test_scopes_are_independent() {
    initialize_tracing();
    let manager = RunManager::new();
    let a = manager.start_new_run("a");
    let b = manager.start_new_run("b");
    manager.start_new_run("a");

    assert!(a.is_cancelled());
    assert!(!b.is_cancelled());
    let mut scopes = manager.active_scopes();
    scopes.sort();
    assert_eq!(scopes, vec!["a".to_string(), "b".to_string()]);
}

/// Cancelling signals the current run without removing it; an empty scope
/// reports `false`.
#[tokio::test]
async fn test_cancel_run() {
    initialize_tracing();
    let manager = RunManager::new();
    assert!(!manager.cancel_run("missing"));

    let run = manager.start_new_run("s1");
    assert!(manager.cancel_run("s1"));
    assert!(run.is_cancelled());
    assert!(manager.get_current_run("s1").is_some());
    assert!(manager.active_scopes().is_empty());
}

/// A run that finishes only removes itself, never its successor.
#[tokio::test]
async fn test_complete_only_removes_own_run() {
    initialize_tracing();
    let manager = RunManager::new();
    let first = manager.start_new_run("s1");
    let second = manager.start_new_run("s1");

    assert!(!manager.complete_run("s1", first.run_id()));
    assert!(manager.get_current_run("s1").is_some());
    assert!(manager.complete_run("s1", second.run_id()));
    assert!(manager.get_current_run("s1").is_none());
}

/// Long running work tied to a run stops as soon as a newer run starts.
#[tokio::test]
async fn test_superseded_work_is_interrupted() {
    initialize_tracing();
    let manager = Arc::new(RunManager::new());
    let first = manager.start_new_run("chat");
    let (started_tx, started_rx) = oneshot::channel();

    let work = tokio::spawn({
        let first = first.clone();
        async move {
            first
                .run_until_cancelled(async move {
                    let _ = started_tx.send(());
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    "finished"
                })
                .await
        }
    });

    started_rx.await.unwrap();
    let second = manager.start_new_run("chat");
    let outcome = tokio::time::timeout(Duration::from_secs(5), work)
        .await
        .expect("interrupted work returns promptly")
        .unwrap();
    assert_eq!(outcome, None);

    let quick = second.run_until_cancelled(async { 42 }).await;
    assert_eq!(quick, Some(42));
}

/// Every runtime carries its own run manager.
#[tokio::test]
async fn test_runtime_run_manager_is_shared() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let run = runtime.run_manager().start_new_run("agent:1");
    let current = runtime.clone().run_manager().get_current_run("agent:1");
    assert_eq!(current.map(|r| r.run_id().to_string()), Some(run.run_id().to_string()));
    runtime.shutdown_all().await?;
    Ok(())
}
