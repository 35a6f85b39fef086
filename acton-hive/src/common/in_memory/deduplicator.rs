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

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::common::config::CONFIG;
use crate::traits::EventDeduplicator;

#[derive(Debug, Default)]
struct ScopeWindow {
    seen: HashSet<String>,
    order: VecDeque<String>,
}

/// An [`EventDeduplicator`] remembering a bounded number of ids per scope.
///
/// When a scope exceeds its capacity the oldest ids are forgotten first.
#[derive(Debug)]
pub struct InMemoryDeduplicator {
    scopes: DashMap<String, ScopeWindow>,
    capacity: usize,
}

impl Default for InMemoryDeduplicator {
    fn default() -> Self {
        Self::with_capacity(CONFIG.limits.dedup_entries_per_scope)
    }
}

impl InMemoryDeduplicator {
    /// Creates a deduplicator remembering up to `capacity` ids per scope.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            scopes: DashMap::new(),
            capacity: capacity.max(1),
        }
    }
}

#[async_trait]
impl EventDeduplicator for InMemoryDeduplicator {
    async fn try_mark_processed(&self, scope: &str, event_id: &str) -> bool {
        let mut window = self.scopes.entry(scope.to_string()).or_default();
        if !window.seen.insert(event_id.to_string()) {
            return false;
        }
        window.order.push_back(event_id.to_string());
        while window.order.len() > self.capacity {
            if let Some(oldest) = window.order.pop_front() {
                window.seen.remove(&oldest);
            }
        }
        true
    }

    async fn forget_scope(&self, scope: &str) {
        self.scopes.remove(scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_sighting_wins_per_scope() {
        let dedup = InMemoryDeduplicator::with_capacity(16);
        assert!(dedup.try_mark_processed("a", "e1").await);
        assert!(!dedup.try_mark_processed("a", "e1").await);
        assert!(dedup.try_mark_processed("b", "e1").await);
    }

    #[tokio::test]
    async fn oldest_ids_are_evicted() {
        let dedup = InMemoryDeduplicator::with_capacity(2);
        assert!(dedup.try_mark_processed("s", "e1").await);
        assert!(dedup.try_mark_processed("s", "e2").await);
        assert!(dedup.try_mark_processed("s", "e3").await);
        assert!(!dedup.try_mark_processed("s", "e3").await);
        assert!(dedup.try_mark_processed("s", "e1").await);
    }

    #[tokio::test]
    async fn forgetting_a_scope_leaves_others() {
        let dedup = InMemoryDeduplicator::with_capacity(16);
        assert!(dedup.try_mark_processed("a", "e1").await);
        assert!(dedup.try_mark_processed("b", "e1").await);
        dedup.forget_scope("a").await;
        assert!(dedup.try_mark_processed("a", "e1").await);
        assert!(!dedup.try_mark_processed("b", "e1").await);
    }
}
