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

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use uuid::Uuid;

use crate::message::agent_id::CHAIN_SEPARATOR;
use crate::message::{AgentId, EventDirection, EventPayload, MessageError};
use crate::traits::AgentEvent;

/// Reserved metadata key holding the comma-joined publisher chain.
pub const PUBLISHERS_METADATA_KEY: &str = "__publishers";

/// The routed message: a typed payload, a propagation direction, and routing metadata.
///
/// An envelope is created by a publisher and afterwards only mutated by appending to
/// its publisher chain as it propagates. Entries are never removed from the chain,
/// so the set of actors that have already handled the envelope only grows, which is
/// what stops routing loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    id: String,
    payload: EventPayload,
    direction: EventDirection,
    metadata: HashMap<String, String>,
    timestamp: DateTime<Utc>,
    publisher_id: Option<AgentId>,
    correlation_id: Option<String>,
}

assert_impl_all!(EventEnvelope: Send, Sync);

impl EventEnvelope {
    /// Creates an envelope with a fresh id and the current time.
    pub fn new(payload: EventPayload, direction: EventDirection) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            payload,
            direction,
            metadata: HashMap::new(),
            timestamp: Utc::now(),
            publisher_id: None,
            correlation_id: None,
        }
    }

    /// Packs `event` and wraps it in a new envelope.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Encode`] if the event cannot be serialized.
    pub fn from_event<E: AgentEvent>(
        event: &E,
        direction: EventDirection,
    ) -> Result<Self, MessageError> {
        Ok(Self::new(EventPayload::pack(event)?, direction))
    }

    /// Replaces the generated id, e.g. when re-delivering a known event.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Records the actor that originally published this envelope.
    #[must_use]
    pub fn with_publisher(mut self, publisher_id: AgentId) -> Self {
        self.publisher_id = Some(publisher_id);
        self
    }

    /// Attaches a correlation id shared by causally related envelopes.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Adds a metadata entry. The reserved publisher key is ignored.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_metadata(key, value);
        self
    }

    /// Inserts a metadata entry, returning `false` if `key` is reserved.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if key == PUBLISHERS_METADATA_KEY {
            return false;
        }
        self.metadata.insert(key, value.into());
        true
    }

    /// The unique id of this logical event.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The carried payload.
    #[inline]
    pub const fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// The requested propagation direction.
    #[inline]
    pub const fn direction(&self) -> EventDirection {
        self.direction
    }

    /// All metadata, including the reserved publisher chain entry.
    #[inline]
    pub const fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// When the envelope was created.
    #[inline]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The actor that originally published the envelope, if recorded.
    #[inline]
    pub const fn publisher_id(&self) -> Option<&AgentId> {
        self.publisher_id.as_ref()
    }

    /// The correlation id, if any.
    #[inline]
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Whether `actor_id` originally published this envelope.
    pub fn originated_from(&self, actor_id: &AgentId) -> bool {
        self.publisher_id.as_ref() == Some(actor_id)
    }

    /// The raw publisher chain entry, e.g. `"Counter:abc,Counter:def"`.
    pub fn publisher_chain(&self) -> Option<&str> {
        self.metadata.get(PUBLISHERS_METADATA_KEY).map(String::as_str)
    }

    /// The publisher chain in the order actors handled the envelope.
    pub fn publishers(&self) -> Vec<AgentId> {
        self.publisher_chain()
            .map(|chain| {
                chain
                    .split(CHAIN_SEPARATOR)
                    .filter(|entry| !entry.is_empty())
                    .filter_map(|entry| AgentId::parse(entry).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The publisher chain as a set, for membership tests.
    pub fn publisher_set(&self) -> HashSet<AgentId> {
        self.publishers().into_iter().collect()
    }

    /// Whether `actor_id` has already handled this envelope.
    pub fn has_publisher(&self, actor_id: &AgentId) -> bool {
        self.publisher_chain().is_some_and(|chain| {
            chain
                .split(CHAIN_SEPARATOR)
                .any(|entry| entry == actor_id.as_str())
        })
    }

    /// Appends `actor_id` to the publisher chain.
    pub(crate) fn append_publisher(&mut self, actor_id: &AgentId) {
        self.metadata
            .entry(PUBLISHERS_METADATA_KEY.to_string())
            .and_modify(|chain| {
                if !chain.is_empty() {
                    chain.push(CHAIN_SEPARATOR);
                }
                chain.push_str(actor_id.as_str());
            })
            .or_insert_with(|| actor_id.to_string());
    }

    /// Encodes the envelope as MessagePack for crossing a process boundary.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Encode`] if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MessageError> {
        rmp_serde::to_vec_named(self).map_err(|e| MessageError::encode("EventEnvelope", e))
    }

    /// Decodes an envelope produced by [`EventEnvelope::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Decode`] if the bytes are not a valid envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        rmp_serde::from_slice(bytes).map_err(|e| MessageError::decode("EventEnvelope", e))
    }
}
