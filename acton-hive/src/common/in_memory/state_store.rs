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

use crate::common::StoreError;
use crate::message::AgentId;
use crate::traits::{StateSnapshot, StateStore};

/// A [`StateStore`] holding the latest snapshot per agent in memory.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    snapshots: DashMap<AgentId, StateSnapshot>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, agent_id: &AgentId) -> Result<Option<StateSnapshot>, StoreError> {
        Ok(self.snapshots.get(agent_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, snapshot: StateSnapshot) -> Result<(), StoreError> {
        self.snapshots.insert(snapshot.agent_id.clone(), snapshot);
        Ok(())
    }

    async fn delete(&self, agent_id: &AgentId) -> Result<(), StoreError> {
        self.snapshots.remove(agent_id);
        Ok(())
    }
}
