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

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::common::StoreError;
use crate::message::{short_type_name, AgentId, MessageError};

/// A serialized copy of an agent's state at a given event version.
///
/// Plain agents store their state with `version` 0. Event-sourced agents store
/// the version of the last event folded into `state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// The agent this state belongs to.
    pub agent_id: AgentId,
    /// The last event version folded into the state.
    pub version: u64,
    /// MessagePack encoded state.
    pub state: Vec<u8>,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

impl StateSnapshot {
    /// Encodes `state` into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Encode`] if `state` cannot be serialized.
    pub fn capture<S: Serialize>(
        agent_id: AgentId,
        version: u64,
        state: &S,
    ) -> Result<Self, MessageError> {
        let state = rmp_serde::to_vec_named(state)
            .map_err(|e| MessageError::encode(short_type_name(std::any::type_name::<S>()), e))?;
        Ok(Self {
            agent_id,
            version,
            state,
            taken_at: Utc::now(),
        })
    }

    /// Decodes the stored state.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Decode`] if the bytes are not an `S`.
    pub fn restore<S: DeserializeOwned>(&self) -> Result<S, MessageError> {
        rmp_serde::from_slice(&self.state)
            .map_err(|e| MessageError::decode(short_type_name(std::any::type_name::<S>()), e))
    }
}

/// Keyed persistence of agent state.
#[async_trait]
pub trait StateStore: Debug + Send + Sync {
    /// The last saved snapshot, if any.
    async fn load(&self, agent_id: &AgentId) -> Result<Option<StateSnapshot>, StoreError>;

    /// Replaces the saved snapshot for `snapshot.agent_id`.
    async fn save(&self, snapshot: StateSnapshot) -> Result<(), StoreError>;

    /// Removes the saved snapshot. Missing entries are not an error.
    async fn delete(&self, agent_id: &AgentId) -> Result<(), StoreError>;
}
