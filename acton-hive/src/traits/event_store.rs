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

use crate::common::StoreError;
use crate::message::{AgentId, StateEvent};

/// Append-only per-agent event log with optimistic concurrency.
#[async_trait]
pub trait EventStore: Debug + Send + Sync {
    /// Appends `events` atomically if the log is currently at `expected_version`.
    ///
    /// `events` must carry versions `expected_version + 1 ..` in order. Returns the
    /// new version. On [`StoreError::VersionConflict`] nothing is appended.
    async fn append(
        &self,
        agent_id: &AgentId,
        events: Vec<StateEvent>,
        expected_version: u64,
    ) -> Result<u64, StoreError>;

    /// Events in ascending version order, optionally only those with
    /// `version > from_version`.
    async fn get_events(
        &self,
        agent_id: &AgentId,
        from_version: Option<u64>,
    ) -> Result<Vec<StateEvent>, StoreError>;

    /// The version of the last appended event, 0 when the log is empty.
    async fn get_version(&self, agent_id: &AgentId) -> Result<u64, StoreError>;

    /// Drops the whole log. Used only when an agent is destroyed.
    async fn delete_events(&self, agent_id: &AgentId) -> Result<(), StoreError>;
}
