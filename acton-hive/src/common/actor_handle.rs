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
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use static_assertions::assert_impl_all;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{instrument, trace, warn};

use crate::actor::ActorCommand;
use crate::common::{ActorError, ActorSender, Reply};
use crate::message::{AgentId, EventDirection, EventEnvelope};
use crate::traits::{AgentActor, AgentEvent, EventModule};

/// A clonable handle for interacting with one hosted agent.
///
/// Every request travels through the agent's command inbox and is served by its
/// actor task in arrival order, so at most one request per agent id is in flight.
/// Equality and hashing use the agent id only.
#[derive(Debug, Clone)]
pub struct ActorHandle {
    pub(crate) id: AgentId,
    pub(crate) outbox: ActorSender,
    tracker: TaskTracker,
    pub(crate) cancellation_token: CancellationToken,
    stop_timeout: Duration,
}

assert_impl_all!(ActorHandle: Send, Sync, Clone);

impl PartialEq for ActorHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ActorHandle {}

impl Hash for ActorHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl ActorHandle {
    pub(crate) fn new(
        id: AgentId,
        outbox: ActorSender,
        cancellation_token: CancellationToken,
        stop_timeout: Duration,
    ) -> Self {
        Self {
            id,
            outbox,
            tracker: TaskTracker::new(),
            cancellation_token,
            stop_timeout,
        }
    }

    /// The tracker of the agent's task.
    pub fn tracker(&self) -> TaskTracker {
        self.tracker.clone()
    }

    /// Whether the agent's task still accepts commands.
    pub fn is_running(&self) -> bool {
        !self.outbox.is_closed()
    }

    async fn send_command(&self, command: ActorCommand) -> Result<(), ActorError> {
        self.outbox
            .send(command)
            .await
            .map_err(|_| ActorError::MailboxClosed(self.id.clone()))
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> ActorCommand,
    ) -> Result<T, ActorError> {
        let (reply, response) = oneshot::channel();
        self.send_command(make(reply)).await?;
        response
            .await
            .map_err(|_| ActorError::NoReply(self.id.clone()))?
    }

    async fn query<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ActorCommand,
    ) -> Result<T, ActorError> {
        let (reply, response) = oneshot::channel();
        self.send_command(make(reply)).await?;
        response
            .await
            .map_err(|_| ActorError::NoReply(self.id.clone()))
    }

    /// Queues `envelope` for handling without waiting for the result.
    ///
    /// # Errors
    ///
    /// [`ActorError::MailboxClosed`] when the agent is no longer running.
    pub async fn enqueue(&self, envelope: EventEnvelope) -> Result<(), ActorError> {
        trace!(actor = %self.id, envelope_id = envelope.id(), "Enqueueing envelope");
        self.send_command(ActorCommand::HandleEvent {
            envelope,
            reply: None,
        })
        .await
    }

    /// Publishes `event` as this agent and waits until it has been handled locally
    /// and handed to the transport. Returns the envelope id.
    #[instrument(skip(self, event), fields(actor = %self.id, event_type = E::TYPE_NAME))]
    pub async fn publish<E: AgentEvent>(
        &self,
        event: &E,
        direction: EventDirection,
    ) -> Result<String, ActorError> {
        let envelope = EventEnvelope::from_event(event, direction)?.with_publisher(self.id.clone());
        let id = envelope.id().to_string();
        self.handle_event(envelope).await?;
        Ok(id)
    }

    /// Adds a dynamic module. An active agent rebuilds its pipeline at once.
    pub async fn register_module(&self, module: Arc<dyn EventModule>) -> Result<(), ActorError> {
        self.request(|reply| ActorCommand::RegisterModule { module, reply })
            .await
    }

    /// The confirmed event version, or `None` for plain agents.
    pub async fn current_version(&self) -> Result<Option<u64>, ActorError> {
        self.query(ActorCommand::CurrentVersion).await
    }

    pub(crate) async fn set_parent(&self, parent: Option<AgentId>) -> Result<(), ActorError> {
        self.request(|reply| ActorCommand::SetParent { parent, reply })
            .await
    }

    pub(crate) async fn add_child(&self, child: AgentId) -> Result<(), ActorError> {
        self.request(|reply| ActorCommand::AddChild { child, reply })
            .await
    }

    pub(crate) async fn remove_child(&self, child: AgentId) -> Result<(), ActorError> {
        self.request(|reply| ActorCommand::RemoveChild { child, reply })
            .await
    }

    /// Deactivates the agent, persisting it, and waits for its task to finish.
    ///
    /// If the agent does not stop within the agent shutdown timeout its task is
    /// cancelled and [`ActorError::ShutdownTimeout`] is returned.
    #[instrument(skip(self), fields(actor = %self.id))]
    pub async fn stop(&self) -> Result<(), ActorError> {
        let stopping = async {
            let result = match self.request(ActorCommand::Terminate).await {
                Err(ActorError::MailboxClosed(_)) => Ok(()),
                other => other,
            };
            self.tracker.wait().await;
            result
        };

        match tokio::time::timeout(self.stop_timeout, stopping).await {
            Ok(result) => {
                trace!("Agent terminated");
                result
            }
            Err(_) => {
                warn!(timeout = ?self.stop_timeout, "Agent did not stop in time; cancelling");
                self.cancellation_token.cancel();
                Err(ActorError::ShutdownTimeout(self.id.clone()))
            }
        }
    }
}

#[async_trait]
impl AgentActor for ActorHandle {
    fn id(&self) -> &AgentId {
        &self.id
    }

    async fn activate(&self) -> Result<(), ActorError> {
        self.request(ActorCommand::Activate).await
    }

    async fn deactivate(&self) -> Result<(), ActorError> {
        self.request(ActorCommand::Deactivate).await
    }

    async fn handle_event(&self, envelope: EventEnvelope) -> Result<(), ActorError> {
        self.request(|reply| ActorCommand::HandleEvent {
            envelope,
            reply: Some(reply),
        })
        .await
    }

    async fn get_parent_id(&self) -> Result<Option<AgentId>, ActorError> {
        self.request(ActorCommand::ParentId).await
    }

    async fn get_children_ids(&self) -> Result<Vec<AgentId>, ActorError> {
        self.request(ActorCommand::ChildrenIds).await
    }

    async fn get_description(&self) -> Result<String, ActorError> {
        self.query(ActorCommand::Description).await
    }

    async fn get_agent_type_name(&self) -> Result<String, ActorError> {
        self.query(ActorCommand::TypeName).await
    }

    async fn configure(&self, config_json: &str) -> Result<(), ActorError> {
        let config = serde_json::from_str(config_json).map_err(|e| ActorError::Configuration {
            agent_id: self.id.clone(),
            reason: e.to_string(),
        })?;
        self.request(|reply| ActorCommand::Configure { config, reply })
            .await
    }
}
