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
use crate::traits::{HierarchyRecord, HierarchyStore};

/// A [`HierarchyStore`] keeping links in memory.
#[derive(Debug, Default)]
pub struct InMemoryHierarchyStore {
    records: DashMap<AgentId, HierarchyRecord>,
}

impl InMemoryHierarchyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HierarchyStore for InMemoryHierarchyStore {
    async fn load(&self, actor_id: &AgentId) -> Result<Option<HierarchyRecord>, StoreError> {
        Ok(self.records.get(actor_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, actor_id: &AgentId, record: HierarchyRecord) -> Result<(), StoreError> {
        self.records.insert(actor_id.clone(), record);
        Ok(())
    }

    async fn delete(&self, actor_id: &AgentId) -> Result<(), StoreError> {
        self.records.remove(actor_id);
        Ok(())
    }
}
