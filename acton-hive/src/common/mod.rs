//! Runtime plumbing shared by the rest of the crate.
//!
//! *   [`HiveApp`]: Starts a hive.
//! *   [`AgentRuntime`]: A running hive; spawns, links and destroys agents.
//! *   [`ActorHandle`]: The external face of one hosted actor.
//! *   [`RunManager`]: Latest-wins cancellation of scoped runs.
//! *   [`StreamTransport`] / [`BrokerTransport`]: How actors reach each other.
//! *   [`in_memory`]: Process-local store and stream adapters.

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

// --- Public Re-exports ---
pub use actor_handle::ActorHandle;
pub use agent_runtime::AgentRuntime;
pub use config::HiveConfig;
pub use error::{ActorError, StoreError, TransportError};
pub use hive::HiveApp;
pub use hive_inner::HiveStores;
pub use run_manager::{RunContext, RunManager};
pub use transport::{BrokerTransport, StreamTransport};
pub use types::HandlerFuture;

// --- Crate-Internal Re-exports ---
pub(crate) use types::{ActorSender, AgentRegistry, ErasedHandler, Reply};

// --- Submodules ---

/// Shared type aliases.
mod types;

/// The `HiveApp` entry point.
mod hive;
/// Internal state of a running hive.
mod hive_inner;
/// The `AgentRuntime` surface.
mod agent_runtime;
/// The `ActorHandle` for actor interaction.
mod actor_handle;
/// Latest-wins run tracking.
mod run_manager;
/// Stream and broker transports.
mod transport;
/// Error types.
mod error;
/// Configuration loading.
pub mod config;
/// In-memory store, stream and deduplication adapters.
pub mod in_memory;
