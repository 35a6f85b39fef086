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

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Acton Hive
//!
//! An agent-actor runtime on Tokio. Agents are addressable actors that exchange
//! typed events across a dynamic parent/child hierarchy.
//!
//! ## Key Concepts
//!
//! - **Envelopes (`EventEnvelope`)**: A serialized payload plus routing metadata:
//!   direction, publisher, correlation id and the chain of actors it has visited.
//! - **Routing (`EventRouter`)**: Forwards envelopes up to the parent, down to the
//!   children, or both. An actor never handles the same envelope twice.
//! - **Pipeline (`EventPipeline`)**: Static handlers registered by the agent and
//!   dynamic `EventModule`s run in one priority order.
//! - **Event sourcing (`EventSourcingBehavior`)**: Agents may persist state as an
//!   append-only event log with optimistic concurrency and periodic snapshots.
//! - **Runs (`RunManager`)**: Starting a run for a scope cancels the previous one.
//! - **Stores**: State, event, hierarchy and stream contracts with in-memory adapters.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use acton_hive::prelude::*;
//!
//! #[agent_event]
//! struct Increment {
//!     amount: i64,
//! }
//!
//! #[agent_state]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! impl AgentState for CounterState {}
//!
//! #[derive(Debug, Default)]
//! struct Counter;
//!
//! impl Agent for Counter {
//!     type State = CounterState;
//!
//!     fn description(&self) -> String {
//!         "counts increments".to_string()
//!     }
//!
//!     fn register_handlers(handlers: &mut HandlerRegistry<Self>) {
//!         handlers.on::<Increment>(|agent, ctx| {
//!             agent.state.count += ctx.event.amount;
//!             Box::pin(async { Ok(()) })
//!         });
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = HiveApp::launch_async().await;
//!     let counter = runtime.spawn_agent(Counter).await?;
//!     let envelope = EventEnvelope::from_event(&Increment { amount: 2 }, EventDirection::SelfOnly)?;
//!     counter.handle_event(envelope).await?;
//!     runtime.shutdown_all().await
//! }
//! ```

/// Runtime plumbing, stores and configuration.
pub(crate) mod common;

/// Agent hosting: handlers, pipeline, routing and event sourcing.
pub(crate) mod actor;

/// Identities, envelopes and payloads.
pub(crate) mod message;

/// Core traits and store contracts.
pub(crate) mod traits;

#[doc(hidden)]
pub use serde;

/// Configuration types and loading.
pub mod config {
    pub use crate::common::config::{
        BehaviorConfig, DefaultsConfig, HiveConfig, LimitsConfig, SnapshotConfig, TimeoutConfig,
        TransportConfig, TransportKind, CONFIG,
    };
}

/// Process-local adapters for every store and stream contract.
pub mod in_memory {
    pub use crate::common::in_memory::{
        InMemoryDeduplicator, InMemoryEventStore, InMemoryHierarchyStore, InMemoryStateStore,
        InMemoryStream, InMemoryStreamProvider,
    };
}

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// ## Macros (from `acton-hive-macro`)
/// *   [`acton_hive_macro::agent_event`]: Attribute macro for declaring events.
/// *   [`acton_hive_macro::agent_state`]: Attribute macro for declaring agent state.
///
/// ## External Crates
/// *   [`async_trait::async_trait`]: The macro for defining async functions in traits.
///
/// ## Core Types
/// *   [`HiveApp`], [`AgentRuntime`], [`ActorHandle`]: Starting a hive and talking to its actors.
/// *   [`AgentConfig`], [`ManagedAgent`], [`HandlerRegistry`]: Defining and hosting agents.
/// *   [`EventEnvelope`], [`EventDirection`], [`AgentId`]: Addressing and routing.
/// *   [`RunManager`], [`RunContext`]: Latest-wins runs.
pub mod prelude {
    // Macros from acton-hive-macro
    pub use acton_hive_macro::{agent_event, agent_state};

    // External crate re-exports
    pub use async_trait::async_trait;

    // Core types
    pub use crate::actor::{
        fold_events, AgentConfig, DispatchReport, EventContext, EventPipeline, EventRouter,
        EventSourcingBehavior, ForwardFailure, ForwardReport, HandlerFailure, HandlerOptions,
        HandlerRegistry, IntervalSnapshotStrategy, ManagedAgent, NeverSnapshotStrategy,
        PipelineEntry, RouteOutcome, SelfHandling,
    };
    pub use crate::common::{
        ActorError, ActorHandle, AgentRuntime, BrokerTransport, HandlerFuture, HiveApp,
        HiveConfig, HiveStores, RunContext, RunManager, StoreError, StreamTransport,
        TransportError,
    };
    pub use crate::message::{
        short_type_name, AgentId, EventDirection, EventEnvelope, EventPayload, MessageError,
        StateEvent, TransportMessage, PUBLISHERS_METADATA_KEY,
    };
    pub use crate::traits::{
        ActorTransport, Agent, AgentActor, AgentEvent, AgentState, AgentStream,
        EventDeduplicator, EventModule, EventPublisher, EventStore, HierarchyRecord,
        HierarchyStore, ModuleContext, SnapshotStrategy, StateSnapshot, StateStore,
        StreamProvider, StreamSubscription,
    };
}
