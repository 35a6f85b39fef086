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

use thiserror::Error;

use crate::message::{AgentId, MessageError};

/// Errors raised by state, event, and hierarchy stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The log moved on since the caller last read it. Nothing was appended.
    #[error("version conflict for {agent_id}: expected version {expected}, store is at {actual}")]
    VersionConflict {
        /// The agent whose log was targeted.
        agent_id: AgentId,
        /// The version the caller expected.
        expected: u64,
        /// The version the store actually holds.
        actual: u64,
    },
    /// Appended events did not carry consecutive versions following the expected one.
    #[error("events for {agent_id} must continue at version {expected}, found {found}")]
    InvalidSequence {
        /// The agent whose log was targeted.
        agent_id: AgentId,
        /// The version the next event had to carry.
        expected: u64,
        /// The version it actually carried.
        found: u64,
    },
    /// Stored bytes could not be encoded or decoded.
    #[error(transparent)]
    Message(#[from] MessageError),
    /// The backing storage failed.
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether this error is an optimistic concurrency conflict.
    #[inline]
    pub const fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Errors raised while handing an envelope to another actor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The target's stream has no consumer.
    #[error("no subscribers on the stream of {0}")]
    NoSubscribers(AgentId),
    /// No actor with that id is known to the runtime.
    #[error("actor {0} is not registered")]
    TargetNotFound(AgentId),
    /// The delivery channel is closed.
    #[error("transport channel to {0} is closed")]
    ChannelClosed(AgentId),
    /// The envelope could not be encoded or decoded.
    #[error(transparent)]
    Message(#[from] MessageError),
}

/// Errors returned by the actor surface and the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActorError {
    /// The actor's task is gone.
    #[error("actor {0} is not running")]
    MailboxClosed(AgentId),
    /// The actor stopped before answering.
    #[error("actor {0} dropped the reply")]
    NoReply(AgentId),
    /// No actor with that id is registered.
    #[error("actor {0} is not registered")]
    NotFound(AgentId),
    /// An actor with that id is already registered.
    #[error("actor {0} is already registered")]
    AlreadyRegistered(AgentId),
    /// Linking would make an actor its own ancestor.
    #[error("linking {parent} -> {child} would create a cycle")]
    HierarchyCycle {
        /// Proposed parent.
        parent: AgentId,
        /// Proposed child.
        child: AgentId,
    },
    /// The operation needs the event-sourcing capability.
    #[error("agent {0} does not have event sourcing enabled")]
    EventSourcingDisabled(AgentId),
    /// `Configure` received a document the agent rejected.
    #[error("invalid configuration for {agent_id}: {reason}")]
    Configuration {
        /// The agent being configured.
        agent_id: AgentId,
        /// Why it was rejected.
        reason: String,
    },
    /// An activation hook failed.
    #[error("activation of {agent_id} failed: {reason}")]
    Activation {
        /// The agent being activated.
        agent_id: AgentId,
        /// Why it failed.
        reason: String,
    },
    /// The actor did not stop within its shutdown timeout.
    #[error("actor {0} did not stop in time")]
    ShutdownTimeout(AgentId),
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// An envelope could not be encoded or decoded.
    #[error(transparent)]
    Message(#[from] MessageError),
    /// Forwarding failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ActorError {
    /// Whether this error wraps an optimistic concurrency conflict from the event store.
    #[inline]
    pub const fn is_version_conflict(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_version_conflict())
    }
}
