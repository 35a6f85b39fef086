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

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::message::{AgentId, EventEnvelope, MessageError};

/// The only frame carried over a message backbone: which actor the envelope is for,
/// and the envelope itself in its binary form.
#[derive(new, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportMessage {
    /// The `AgentId` string of the receiving actor.
    pub target_actor_id: String,
    /// The MessagePack-encoded [`EventEnvelope`].
    pub envelope_bytes: Vec<u8>,
}

impl TransportMessage {
    /// Encodes `envelope` for delivery to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Encode`] if the envelope cannot be serialized.
    pub fn wrap(target: &AgentId, envelope: &EventEnvelope) -> Result<Self, MessageError> {
        Ok(Self::new(target.to_string(), envelope.to_bytes()?))
    }

    /// Decodes the target id and envelope.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidAgentId`] or [`MessageError::Decode`] when
    /// either part is malformed.
    pub fn open(&self) -> Result<(AgentId, EventEnvelope), MessageError> {
        let target = AgentId::parse(self.target_actor_id.clone())?;
        let envelope = EventEnvelope::from_bytes(&self.envelope_bytes)?;
        Ok((target, envelope))
    }

    /// Encodes the whole frame.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Encode`] if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MessageError> {
        rmp_serde::to_vec_named(self).map_err(|e| MessageError::encode("TransportMessage", e))
    }

    /// Decodes a frame produced by [`TransportMessage::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Decode`] if the bytes are not a valid frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        rmp_serde::from_slice(bytes).map_err(|e| MessageError::decode("TransportMessage", e))
    }
}
