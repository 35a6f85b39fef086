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

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{instrument, trace};

use crate::common::StoreError;
use crate::message::{AgentId, StateEvent};
use crate::traits::EventStore;

/// An [`EventStore`] holding every log in memory.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    logs: DashMap<AgentId, Vec<StateEvent>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    #[instrument(skip(self, events), fields(count = events.len()))]
    async fn append(
        &self,
        agent_id: &AgentId,
        events: Vec<StateEvent>,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut log = self.logs.entry(agent_id.clone()).or_default();
        let actual = log.last().map_or(0, |event| event.version);
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                agent_id: agent_id.clone(),
                expected: expected_version,
                actual,
            });
        }

        for (next, event) in (expected_version + 1..).zip(events.iter()) {
            if event.version != next {
                return Err(StoreError::InvalidSequence {
                    agent_id: agent_id.clone(),
                    expected: next,
                    found: event.version,
                });
            }
        }

        log.extend(events);
        let new_version = log.last().map_or(0, |event| event.version);
        trace!(new_version, "Appended events");
        Ok(new_version)
    }

    async fn get_events(
        &self,
        agent_id: &AgentId,
        from_version: Option<u64>,
    ) -> Result<Vec<StateEvent>, StoreError> {
        let after = from_version.unwrap_or(0);
        Ok(self
            .logs
            .get(agent_id)
            .map(|log| {
                log.iter()
                    .filter(|event| event.version > after)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_version(&self, agent_id: &AgentId) -> Result<u64, StoreError> {
        Ok(self
            .logs
            .get(agent_id)
            .and_then(|log| log.last().map(|event| event.version))
            .unwrap_or(0))
    }

    async fn delete_events(&self, agent_id: &AgentId) -> Result<(), StoreError> {
        self.logs.remove(agent_id);
        Ok(())
    }
}
