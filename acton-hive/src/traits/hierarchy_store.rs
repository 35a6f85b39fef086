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

use std::collections::BTreeSet;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::StoreError;
use crate::message::AgentId;

/// The persisted parent/children links of one actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyRecord {
    /// The parent, if any.
    pub parent_id: Option<AgentId>,
    /// The children, without duplicates.
    pub children_ids: BTreeSet<AgentId>,
}

impl HierarchyRecord {
    /// Whether the record carries no links at all.
    pub fn is_empty(&self) -> bool {
        self.parent_id.is_none() && self.children_ids.is_empty()
    }
}

/// Keyed persistence of hierarchy links.
#[async_trait]
pub trait HierarchyStore: Debug + Send + Sync {
    /// The saved links, if any.
    async fn load(&self, actor_id: &AgentId) -> Result<Option<HierarchyRecord>, StoreError>;

    /// Replaces the saved links.
    async fn save(&self, actor_id: &AgentId, record: HierarchyRecord) -> Result<(), StoreError>;

    /// Removes the saved links. Missing entries are not an error.
    async fn delete(&self, actor_id: &AgentId) -> Result<(), StoreError>;
}
