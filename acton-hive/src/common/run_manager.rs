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

use std::future::Future;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

/// One interruptible execution attempt within a scope.
///
/// Cancellation is cooperative: work tied to the run must watch
/// [`cancelled`](Self::cancelled) or wrap itself in [`run_until_cancelled`](Self::run_until_cancelled).
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: String,
    scope_id: String,
    token: CancellationToken,
    started_at: DateTime<Utc>,
}

impl RunContext {
    fn new(scope_id: &str) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            scope_id: scope_id.to_string(),
            token: CancellationToken::new(),
            started_at: Utc::now(),
        }
    }

    /// The unique id of this run.
    #[inline]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The scope this run occupies.
    #[inline]
    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// When the run was started.
    #[inline]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// A clone of the run's cancellation token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once cancellation is signalled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Runs `work` until it finishes or the run is cancelled, whichever comes first.
    pub async fn run_until_cancelled<F: Future>(&self, work: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.token.cancelled() => None,
            output = work => Some(output),
        }
    }
}

/// Latest-wins run tracking, one live run per scope.
///
/// Starting a run replaces the scope's current run and cancels it under the same map
/// entry lock, so concurrent starters on one scope cannot both end up live.
///
/// Entries leave the map only through [`complete_run`](Self::complete_run) or
/// [`prune_cancelled`](Self::prune_cancelled). A cancelled run stays visible to
/// [`get_current_run`](Self::get_current_run) until one of them removes it.
#[derive(Debug, Default)]
pub struct RunManager {
    runs: DashMap<String, RunContext>,
}

impl RunManager {
    /// A manager with no runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run in `scope_id`, cancelling whatever run occupied it.
    #[instrument(skip(self))]
    pub fn start_new_run(&self, scope_id: &str) -> RunContext {
        let context = RunContext::new(scope_id);
        match self.runs.entry(scope_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                let previous = occupied.insert(context.clone());
                previous.token.cancel();
                debug!(previous = %previous.run_id, current = %context.run_id, "Replaced run");
            }
            Entry::Vacant(vacant) => {
                vacant.insert(context.clone());
                trace!(current = %context.run_id, "Started run");
            }
        }
        context
    }

    /// The run currently occupying `scope_id`, cancelled or not.
    pub fn get_current_run(&self, scope_id: &str) -> Option<RunContext> {
        self.runs.get(scope_id).map(|entry| entry.value().clone())
    }

    /// Signals cancellation on the current run without replacing it. Returns `false`
    /// when the scope is empty.
    #[instrument(skip(self))]
    pub fn cancel_run(&self, scope_id: &str) -> bool {
        match self.runs.get(scope_id) {
            Some(entry) => {
                entry.token.cancel();
                debug!(run = %entry.run_id, "Cancelled run");
                true
            }
            None => false,
        }
    }

    /// Removes the scope's run if it is still `run_id`. A run that was already
    /// replaced leaves its successor in place.
    pub fn complete_run(&self, scope_id: &str, run_id: &str) -> bool {
        self.runs
            .remove_if(scope_id, |_, context| context.run_id == run_id)
            .is_some()
    }

    /// Drops every scope whose current run has been cancelled and returns how many
    /// were removed. Live runs are untouched.
    #[instrument(skip(self))]
    pub fn prune_cancelled(&self) -> usize {
        let before = self.runs.len();
        self.runs.retain(|_, context| !context.token.is_cancelled());
        let removed = before.saturating_sub(self.runs.len());
        if removed > 0 {
            debug!(removed, "Pruned cancelled runs");
        }
        removed
    }

    /// Scopes whose current run has not been cancelled.
    pub fn active_scopes(&self) -> Vec<String> {
        self.runs
            .iter()
            .filter(|entry| !entry.token.is_cancelled())
            .map(|entry| entry.key().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completing_a_replaced_run_keeps_the_successor() {
        let manager = RunManager::new();
        let first = manager.start_new_run("s1");
        let second = manager.start_new_run("s1");

        assert!(!manager.complete_run("s1", first.run_id()));
        assert_eq!(
            manager.get_current_run("s1").map(|run| run.run_id().to_string()),
            Some(second.run_id().to_string())
        );
        assert!(manager.complete_run("s1", second.run_id()));
        assert!(manager.get_current_run("s1").is_none());
    }

    #[test]
    fn cancel_keeps_the_run_in_place() {
        let manager = RunManager::new();
        let run = manager.start_new_run("s1");
        assert!(manager.cancel_run("s1"));
        assert!(run.is_cancelled());
        assert!(manager.get_current_run("s1").is_some());
        assert!(manager.active_scopes().is_empty());
        assert!(!manager.cancel_run("missing"));
    }

    #[test]
    fn pruning_drops_only_cancelled_scopes() {
        let manager = RunManager::new();
        let abandoned = manager.start_new_run("s1");
        let live = manager.start_new_run("s2");
        manager.cancel_run("s1");

        assert_eq!(manager.prune_cancelled(), 1);
        assert!(abandoned.is_cancelled());
        assert!(manager.get_current_run("s1").is_none());
        assert_eq!(
            manager.get_current_run("s2").map(|run| run.run_id().to_string()),
            Some(live.run_id().to_string())
        );
        assert_eq!(manager.prune_cancelled(), 0);
    }
}
