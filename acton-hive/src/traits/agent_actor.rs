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

use crate::common::ActorError;
use crate::message::{AgentId, EventEnvelope};

/// The RPC-safe actor surface.
///
/// Every operation is a request/response that can cross a process boundary, so a
/// caller cannot tell whether the agent behind it runs in-process or on a remote host.
#[async_trait]
pub trait AgentActor: Send + Sync {
    /// The id of the agent behind this actor.
    fn id(&self) -> &AgentId;

    /// Restores state and hierarchy and builds the pipeline. Idempotent.
    async fn activate(&self) -> Result<(), ActorError>;

    /// Persists state and hierarchy. The next event reactivates the agent.
    async fn deactivate(&self) -> Result<(), ActorError>;

    /// Routes `envelope` through this actor and returns once local handling and
    /// forwarding hand-off are done.
    async fn handle_event(&self, envelope: EventEnvelope) -> Result<(), ActorError>;

    /// The parent, if any.
    async fn get_parent_id(&self) -> Result<Option<AgentId>, ActorError>;

    /// The children, in id order.
    async fn get_children_ids(&self) -> Result<Vec<AgentId>, ActorError>;

    /// The agent's description.
    async fn get_description(&self) -> Result<String, ActorError>;

    /// The fully qualified type name of the agent.
    async fn get_agent_type_name(&self) -> Result<String, ActorError>;

    /// Applies a JSON configuration document.
    async fn configure(&self, config_json: &str) -> Result<(), ActorError>;
}
