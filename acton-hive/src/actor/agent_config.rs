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

use std::fmt;
use std::sync::Arc;

use crate::message::AgentId;
use crate::traits::{EventModule, SnapshotStrategy};

/// Configuration for spawning one agent.
///
/// Identity, an optional parent, optional capabilities and dynamic modules. Anything
/// left unset falls back to the runtime's [`HiveConfig`](crate::common::config::HiveConfig).
///
/// ```rust,ignore
/// let config = AgentConfig::new()
///     .with_raw_id("abc")
///     .with_parent(root.id().clone())
///     .event_sourced()
///     .with_snapshot_strategy(Arc::new(IntervalSnapshotStrategy::new(10)));
/// ```
#[derive(Clone, Default)]
pub struct AgentConfig {
    id: Option<AgentId>,
    raw_id: Option<String>,
    parent: Option<AgentId>,
    event_sourced: bool,
    snapshot_strategy: Option<Arc<dyn SnapshotStrategy>>,
    modules: Vec<Arc<dyn EventModule>>,
    inbox_capacity: Option<usize>,
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("id", &self.id)
            .field("raw_id", &self.raw_id)
            .field("parent", &self.parent)
            .field("event_sourced", &self.event_sourced)
            .field("modules", &self.modules.len())
            .field("inbox_capacity", &self.inbox_capacity)
            .finish_non_exhaustive()
    }
}

impl AgentConfig {
    /// An empty configuration: random raw id, no parent, plain state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a fixed full id instead of deriving one from the agent type.
    #[must_use]
    pub fn with_id(mut self, id: AgentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Uses a fixed raw id with the short name of the agent type.
    #[must_use]
    pub fn with_raw_id(mut self, raw_id: impl Into<String>) -> Self {
        self.raw_id = Some(raw_id.into());
        self
    }

    /// Links the agent under `parent` once spawned.
    #[must_use]
    pub fn with_parent(mut self, parent: AgentId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attaches the event-sourcing capability.
    #[must_use]
    pub const fn event_sourced(mut self) -> Self {
        self.event_sourced = true;
        self
    }

    /// Overrides the snapshot policy of an event-sourced agent.
    #[must_use]
    pub fn with_snapshot_strategy(mut self, strategy: Arc<dyn SnapshotStrategy>) -> Self {
        self.snapshot_strategy = Some(strategy);
        self
    }

    /// Adds a dynamic module to the agent's pipeline.
    #[must_use]
    pub fn with_module(mut self, module: Arc<dyn EventModule>) -> Self {
        self.modules.push(module);
        self
    }

    /// Overrides the command inbox capacity.
    #[must_use]
    pub const fn with_inbox_capacity(mut self, capacity: usize) -> Self {
        self.inbox_capacity = Some(capacity);
        self
    }

    /// The id an agent of type `A` gets from this configuration.
    pub fn resolve_id<A: ?Sized>(&self) -> AgentId {
        self.id
            .clone()
            .unwrap_or_else(|| AgentId::for_type::<A>(self.raw_id.as_deref()))
    }

    /// The parent to link under, if any.
    #[inline]
    pub const fn parent(&self) -> Option<&AgentId> {
        self.parent.as_ref()
    }

    /// Whether event sourcing is attached.
    #[inline]
    pub const fn is_event_sourced(&self) -> bool {
        self.event_sourced
    }

    pub(crate) fn snapshot_strategy(&self) -> Option<Arc<dyn SnapshotStrategy>> {
        self.snapshot_strategy.clone()
    }

    pub(crate) fn modules(&self) -> &[Arc<dyn EventModule>] {
        &self.modules
    }

    pub(crate) const fn inbox_capacity(&self) -> Option<usize> {
        self.inbox_capacity
    }
}
