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

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::common::config::HiveConfig;
use crate::common::in_memory::{
    InMemoryDeduplicator, InMemoryEventStore, InMemoryHierarchyStore, InMemoryStateStore,
    InMemoryStreamProvider,
};
use crate::common::{AgentRegistry, RunManager};
use crate::traits::{
    ActorTransport, EventDeduplicator, EventStore, HierarchyStore, StateStore, StreamProvider,
};

/// The persistence and delivery collaborators a runtime is built on.
///
/// Runtime code only ever sees the traits. [`HiveStores::in_memory`] wires the
/// process-local adapters.
#[derive(Debug, Clone)]
pub struct HiveStores {
    /// Agent state and snapshots.
    pub state_store: Arc<dyn StateStore>,
    /// Event logs of event-sourced agents.
    pub event_store: Arc<dyn EventStore>,
    /// Parent/children links.
    pub hierarchy_store: Arc<dyn HierarchyStore>,
    /// Per-actor streams.
    pub streams: Arc<dyn StreamProvider>,
    /// Inbound envelope deduplication.
    pub deduplicator: Arc<dyn EventDeduplicator>,
}

impl HiveStores {
    /// In-memory adapters sized from `config`.
    pub fn in_memory(config: &HiveConfig) -> Self {
        Self {
            state_store: Arc::new(InMemoryStateStore::new()),
            event_store: Arc::new(InMemoryEventStore::new()),
            hierarchy_store: Arc::new(InMemoryHierarchyStore::new()),
            streams: Arc::new(InMemoryStreamProvider::with_capacity(config.limits.stream_capacity)),
            deduplicator: Arc::new(InMemoryDeduplicator::with_capacity(
                config.limits.dedup_entries_per_scope,
            )),
        }
    }
}

/// Internal state of a running hive.
#[derive(Debug)]
pub struct HiveInner {
    /// Every hosted actor, keyed by id.
    pub(crate) registry: AgentRegistry,

    /// Stores and streams.
    pub(crate) stores: HiveStores,

    /// How actors reach each other.
    pub(crate) transport: Arc<dyn ActorTransport>,

    /// Latest-wins run tracking.
    pub(crate) run_manager: Arc<RunManager>,

    /// Tracks stream forwarders and the broker consumer.
    pub(crate) tracker: TaskTracker,

    /// Parent of every actor's token; cancelling it forcefully stops everything.
    pub(crate) cancellation_token: CancellationToken,

    /// Runtime configuration.
    pub(crate) config: HiveConfig,
}
