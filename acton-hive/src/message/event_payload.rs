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

use serde::{Deserialize, Serialize};

use crate::message::MessageError;
use crate::traits::AgentEvent;

/// A typed-union value: the event's stable type identifier plus its serialized body.
///
/// Payloads are opaque to routing. Only handlers that know the concrete
/// [`AgentEvent`] type unpack them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    type_identifier: String,
    body: Vec<u8>,
}

impl EventPayload {
    /// Wraps an already-encoded body.
    pub fn new(type_identifier: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            type_identifier: type_identifier.into(),
            body,
        }
    }

    /// Encodes `event` as MessagePack under its [`AgentEvent::TYPE_NAME`].
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Encode`] if serialization fails.
    pub fn pack<E: AgentEvent>(event: &E) -> Result<Self, MessageError> {
        let body =
            rmp_serde::to_vec_named(event).map_err(|e| MessageError::encode(E::TYPE_NAME, e))?;
        Ok(Self::new(E::TYPE_NAME, body))
    }

    /// Decodes the body as `E`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::TypeMismatch`] when the payload carries a different
    /// type identifier, or [`MessageError::Decode`] when the body is malformed.
    pub fn unpack<E: AgentEvent>(&self) -> Result<E, MessageError> {
        if !self.is::<E>() {
            return Err(MessageError::TypeMismatch {
                expected: E::TYPE_NAME.to_string(),
                found: self.type_identifier.clone(),
            });
        }
        rmp_serde::from_slice(&self.body).map_err(|e| MessageError::decode(E::TYPE_NAME, e))
    }

    /// Whether this payload carries an `E`.
    #[inline]
    pub fn is<E: AgentEvent>(&self) -> bool {
        self.type_identifier == E::TYPE_NAME
    }

    /// The stable type identifier of the carried event.
    #[inline]
    pub fn type_identifier(&self) -> &str {
        &self.type_identifier
    }

    /// The encoded event body.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
