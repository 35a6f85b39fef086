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

//! Defines the contracts of the Acton Hive runtime.
//!
//! # Key Traits
//!
//! *   [`AgentEvent`] / [`AgentState`]: what can be routed and what can be persisted.
//! *   [`Agent`]: a unit of identity, state, and behavior; declares its static handler table.
//! *   [`AgentActor`]: the RPC-safe actor surface, identical for local and remote placement.
//! *   [`EventModule`]: a dynamically supplied pipeline entry.
//! *   [`EventPublisher`]: lets handlers and modules publish new envelopes.
//! *   [`StateStore`], [`EventStore`], [`HierarchyStore`], [`StreamProvider`],
//!     [`EventDeduplicator`], [`ActorTransport`]: pluggable persistence and transport
//!     collaborators. In-memory implementations live in `common::in_memory`.
//! *   [`SnapshotStrategy`]: decides when to materialize a state snapshot.

// --- Public Re-exports ---
pub use actor_transport::ActorTransport;
pub use agent::Agent;
pub use agent_actor::AgentActor;
pub use agent_event::AgentEvent;
pub use agent_state::AgentState;
pub use event_deduplicator::EventDeduplicator;
pub use event_module::{EventModule, ModuleContext};
pub use event_publisher::EventPublisher;
pub use event_store::EventStore;
pub use hierarchy_store::{HierarchyRecord, HierarchyStore};
pub use snapshot_strategy::SnapshotStrategy;
pub use state_store::{StateSnapshot, StateStore};
pub use stream_provider::{AgentStream, StreamProvider, StreamSubscription};

// --- Submodules ---

/// Defines the [`ActorTransport`] trait.
mod actor_transport;
/// Defines the [`Agent`] trait.
mod agent;
/// Defines the [`AgentActor`] trait.
mod agent_actor;
/// Defines the [`AgentEvent`] trait.
mod agent_event;
/// Defines the [`AgentState`] trait.
mod agent_state;
/// Defines the [`EventDeduplicator`] trait.
mod event_deduplicator;
/// Defines the [`EventModule`] trait and [`ModuleContext`].
mod event_module;
/// Defines the [`EventPublisher`] trait.
mod event_publisher;
/// Defines the [`EventStore`] trait.
mod event_store;
/// Defines the [`HierarchyStore`] trait.
mod hierarchy_store;
/// Defines the [`SnapshotStrategy`] trait.
mod snapshot_strategy;
/// Defines the [`StateStore`] trait.
mod state_store;
/// Defines the [`StreamProvider`] and [`AgentStream`] traits.
mod stream_provider;
