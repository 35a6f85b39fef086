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

//! Hosts agents: identity configuration, the handler table, the priority pipeline,
//! directional routing, event sourcing, and the managed agent that ties them together.

// --- Public Re-exports ---
pub use agent_config::AgentConfig;
pub use event_sourcing::{fold_events, EventSourcingBehavior};
pub use handler_registry::{EventContext, HandlerOptions, HandlerRegistry, SelfHandling};
pub use managed_agent::ManagedAgent;
pub use pipeline::{DispatchReport, EventPipeline, HandlerFailure, PipelineEntry};
pub use router::{EventRouter, ForwardFailure, ForwardReport, RouteOutcome};
pub use snapshot::{IntervalSnapshotStrategy, NeverSnapshotStrategy};

// --- Crate-Internal Re-exports ---
pub(crate) use managed_agent::ActorCommand;

// --- Submodules ---

/// Defines [`AgentConfig`].
mod agent_config;
/// Defines [`EventSourcingBehavior`].
mod event_sourcing;
/// Defines [`HandlerRegistry`] and handler options.
mod handler_registry;
/// Defines [`ManagedAgent`] and its actor task.
mod managed_agent;
/// Defines [`EventPipeline`].
mod pipeline;
/// Defines [`EventRouter`].
mod router;
/// Defines the snapshot strategies.
mod snapshot;
