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

use crate::message::{AgentId, EventEnvelope};
use crate::traits::EventPublisher;

/// A dynamically supplied pipeline entry.
///
/// Modules describe their own priority and filter. They are merged with the agent's
/// static handlers when the pipeline is built for an activation.
#[async_trait]
pub trait EventModule: Debug + Send + Sync {
    /// Name used when reporting failures.
    fn name(&self) -> &str;

    /// Lower runs earlier.
    fn priority(&self) -> i32 {
        0
    }

    /// Whether this module wants `envelope`.
    fn can_handle(&self, envelope: &EventEnvelope) -> bool;

    /// Processes `envelope`. Publications made through `ctx` are routed after the
    /// whole pipeline has run.
    async fn handle(&self, envelope: &EventEnvelope, ctx: &mut ModuleContext) -> anyhow::Result<()>;
}

/// What a module sees of the agent it runs in.
#[derive(Debug)]
pub struct ModuleContext {
    agent_id: AgentId,
    outbox: Vec<EventEnvelope>,
}

impl ModuleContext {
    pub(crate) fn new(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            outbox: Vec::new(),
        }
    }

    /// The id of the agent running the module.
    #[inline]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    pub(crate) fn into_outbox(self) -> Vec<EventEnvelope> {
        self.outbox
    }
}

impl EventPublisher for ModuleContext {
    fn publisher_id(&self) -> &AgentId {
        &self.agent_id
    }

    fn enqueue(&mut self, envelope: EventEnvelope) {
        self.outbox.push(envelope);
    }
}
