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

//! Defines the message and addressing types every other component operates on.
//!
//! # Key Components
//!
//! *   [`AgentId`]: The `ShortTypeName:RawId` address of an agent.
//! *   [`EventEnvelope`]: The unit of routing. It carries a typed [`EventPayload`], a
//!     propagation [`EventDirection`], and the publisher chain used for loop prevention.
//! *   [`StateEvent`]: One durable fact in an agent's append-only event log.
//! *   [`TransportMessage`]: The broker frame pairing a target actor id with an
//!     encoded envelope.
//! *   [`MessageError`]: Codec and identity failures.

// --- Public Re-exports ---
pub use agent_id::{short_type_name, AgentId};
pub use event_direction::EventDirection;
pub use event_envelope::{EventEnvelope, PUBLISHERS_METADATA_KEY};
pub use event_payload::EventPayload;
pub use message_error::MessageError;
pub use state_event::StateEvent;
pub use transport_message::TransportMessage;

// --- Submodules ---

/// Defines [`AgentId`] and its normalization helpers.
mod agent_id;
/// Defines [`EventDirection`].
mod event_direction;
/// Defines [`EventEnvelope`] and the publisher chain.
mod event_envelope;
/// Defines [`EventPayload`].
mod event_payload;
/// Defines [`MessageError`].
mod message_error;
/// Defines [`StateEvent`].
mod state_event;
/// Defines [`TransportMessage`].
mod transport_message;
