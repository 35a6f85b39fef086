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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{AgentId, EventPayload, MessageError};
use crate::traits::AgentEvent;

/// One durable fact in an agent's append-only log.
///
/// For a given agent, versions start at 1 and increase by exactly one per event.
/// Once appended a `StateEvent` is never updated or removed individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEvent {
    /// Unique id of this fact.
    pub event_id: String,
    /// Position in the agent's log, starting at 1.
    pub version: u64,
    /// The type identifier of `event_data`.
    pub event_type: String,
    /// The domain event itself.
    pub event_data: EventPayload,
    /// The agent whose log this event belongs to.
    pub agent_id: AgentId,
    /// When the event was confirmed.
    pub timestamp: DateTime<Utc>,
}

impl StateEvent {
    /// Wraps a pending domain event at the given version.
    pub fn new(agent_id: AgentId, version: u64, event_data: EventPayload) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            version,
            event_type: event_data.type_identifier().to_string(),
            event_data,
            agent_id,
            timestamp: Utc::now(),
        }
    }

    /// Whether the event data is an `E`.
    #[inline]
    pub fn is<E: AgentEvent>(&self) -> bool {
        self.event_data.is::<E>()
    }

    /// Decodes the event data as `E`.
    ///
    /// # Errors
    ///
    /// See [`EventPayload::unpack`].
    pub fn unpack<E: AgentEvent>(&self) -> Result<E, MessageError> {
        self.event_data.unpack()
    }
}
