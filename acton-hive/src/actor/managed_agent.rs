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

use std::fmt;
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc::{self, Receiver};
use tracing::{debug, trace};

pub(crate) use command::ActorCommand;

use crate::actor::{
    AgentConfig, EventPipeline, EventRouter, EventSourcingBehavior, HandlerRegistry,
    IntervalSnapshotStrategy,
};
use crate::common::{ActorError, ActorHandle, AgentRuntime};
use crate::message::{AgentId, EventEnvelope};
use crate::traits::{Agent, AgentEvent, EventModule, EventPublisher, SnapshotStrategy};

mod activation;
mod command;
mod started;

/// The runtime wrapper that owns one agent while it is hosted.
///
/// A `ManagedAgent` lives inside its actor task and processes one command at a time,
/// so handlers get exclusive `&mut` access to the agent's model and state. The actor
/// surface reaches it through an [`ActorHandle`].
///
/// Handlers publish through the [`EventPublisher`] impl and, when the agent is event
/// sourced, call [`raise_event`](Self::raise_event) and
/// [`confirm_events`](Self::confirm_events).
pub struct ManagedAgent<A: Agent> {
    pub(crate) id: AgentId,

    /// The agent itself.
    pub model: A,

    /// The agent's persistable state.
    ///
    /// Restored on activation and saved after turns and on deactivation. Event-sourced
    /// agents should only change it through confirmed events.
    pub state: A::State,

    pub(crate) handle: ActorHandle,
    pub(crate) runtime: AgentRuntime,
    router: EventRouter,
    handlers: Arc<HandlerRegistry<A>>,
    registered_modules: Vec<Arc<dyn EventModule>>,
    pipeline: Arc<EventPipeline<A>>,
    event_sourcing: Option<EventSourcingBehavior<A::State>>,
    snapshot_strategy: Arc<dyn SnapshotStrategy>,
    outbox: Vec<EventEnvelope>,
    turn_correlation: Option<String>,
    active: bool,
}

impl<A: Agent> ManagedAgent<A> {
    pub(crate) fn new(
        id: AgentId,
        model: A,
        config: &AgentConfig,
        runtime: AgentRuntime,
    ) -> (Self, Receiver<ActorCommand>) {
        let capacity = config
            .inbox_capacity()
            .unwrap_or(runtime.config().limits.agent_inbox_capacity)
            .max(1);
        let (outbox, inbox) = mpsc::channel(capacity);
        let handle = ActorHandle::new(
            id.clone(),
            outbox,
            runtime.0.cancellation_token.child_token(),
            runtime.config().agent_shutdown_timeout(),
        );
        let event_sourcing = config
            .is_event_sourced()
            .then(|| EventSourcingBehavior::new(id.clone(), Arc::clone(&runtime.stores().event_store)));
        let snapshot_strategy = config.snapshot_strategy().unwrap_or_else(|| {
            Arc::new(IntervalSnapshotStrategy::new(runtime.config().snapshots.interval))
        });

        trace!(actor = %id, capacity, event_sourced = event_sourcing.is_some(), "Creating managed agent");
        let agent = Self {
            router: EventRouter::new(id.clone()),
            id,
            model,
            state: A::State::default(),
            handle,
            runtime,
            handlers: Arc::new(HandlerRegistry::for_agent()),
            registered_modules: config.modules().to_vec(),
            pipeline: Arc::new(EventPipeline::default()),
            event_sourcing,
            snapshot_strategy,
            outbox: Vec::new(),
            turn_correlation: None,
            active: false,
        };
        (agent, inbox)
    }

    /// Spawns the actor task and returns the handle to it.
    pub(crate) fn start(self, inbox: Receiver<ActorCommand>) -> ActorHandle {
        let handle = self.handle.clone();
        let tracker = handle.tracker();
        tracker.spawn(self.wake(inbox));
        tracker.close();
        handle
    }

    /// The agent's id.
    #[inline]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// The handle other parts of the system use to reach this agent.
    #[inline]
    pub const fn handle(&self) -> &ActorHandle {
        &self.handle
    }

    /// The runtime hosting this agent.
    #[inline]
    pub const fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    /// The parent, if any.
    #[inline]
    pub const fn parent_id(&self) -> Option<&AgentId> {
        self.router.parent()
    }

    /// The children, in id order.
    pub fn children_ids(&self) -> Vec<AgentId> {
        self.router.children().iter().cloned().collect()
    }

    /// Whether the agent is currently activated.
    #[inline]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The current pipeline.
    pub fn pipeline(&self) -> &EventPipeline<A> {
        &self.pipeline
    }

    /// The confirmed event version, if event sourcing is attached.
    pub fn current_version(&self) -> Option<u64> {
        self.event_sourcing
            .as_ref()
            .map(EventSourcingBehavior::current_version)
    }

    /// Buffers `event` for the next [`confirm_events`](Self::confirm_events).
    ///
    /// # Errors
    ///
    /// [`ActorError::EventSourcingDisabled`] when the capability is not attached, or
    /// [`ActorError::Message`] when the event cannot be encoded.
    pub fn raise_event<E: AgentEvent>(&mut self, event: &E) -> Result<(), ActorError> {
        let behavior = self
            .event_sourcing
            .as_mut()
            .ok_or_else(|| ActorError::EventSourcingDisabled(self.id.clone()))?;
        behavior.raise(event)?;
        Ok(())
    }

    /// Appends the pending events, applies them to [`state`](Self::state), and writes a
    /// snapshot when the strategy accepts any of the committed versions. Returns the
    /// new version.
    ///
    /// # Errors
    ///
    /// [`ActorError::EventSourcingDisabled`] when the capability is not attached, or
    /// [`ActorError::Store`] (a version conflict among others) when the append fails.
    /// After a failure the pending events and version are unchanged.
    pub async fn confirm_events(&mut self) -> Result<u64, ActorError> {
        let behavior = self
            .event_sourcing
            .as_mut()
            .ok_or_else(|| ActorError::EventSourcingDisabled(self.id.clone()))?;
        let committed = behavior.confirm_events().await?;
        let version = behavior.current_version();
        if committed.is_empty() {
            return Ok(version);
        }

        let state = std::mem::take(&mut self.state);
        self.state = crate::actor::fold_events(state, &committed);

        if committed
            .iter()
            .any(|event| self.snapshot_strategy.should_create_snapshot(event.version))
        {
            self.save_snapshot(version).await;
        }
        Ok(version)
    }

    /// Catches up with events appended to the log by another writer.
    ///
    /// Folds every event after [`current_version`](Self::current_version) into
    /// [`state`](Self::state) and moves the version to the end of the log. Pending
    /// events are kept, so a confirm that failed with a version conflict can be
    /// retried right after. Returns the new version.
    ///
    /// # Errors
    ///
    /// [`ActorError::EventSourcingDisabled`] when the capability is not attached, or
    /// [`ActorError::Store`] when the log cannot be read. State and version are
    /// unchanged on failure.
    pub async fn refresh_events(&mut self) -> Result<u64, ActorError> {
        let behavior = self
            .event_sourcing
            .as_mut()
            .ok_or_else(|| ActorError::EventSourcingDisabled(self.id.clone()))?;
        let from = behavior.current_version();
        let newer = behavior.events_after(from).await?;
        if let Some(last) = newer.last() {
            let state = std::mem::take(&mut self.state);
            self.state = crate::actor::fold_events(state, &newer);
            behavior.advance_to(last.version);
            debug!(actor = %self.id, from, to = last.version, "Refreshed from event log");
        }
        Ok(behavior.current_version())
    }

    /// Routes `envelope` as this agent's own publication once the current turn ends.
    pub fn publish_envelope(&mut self, envelope: EventEnvelope) {
        self.enqueue(envelope.with_publisher(self.id.clone()));
    }
}

impl<A: Agent> EventPublisher for ManagedAgent<A> {
    fn publisher_id(&self) -> &AgentId {
        &self.id
    }

    fn enqueue(&mut self, envelope: EventEnvelope) {
        let envelope = match (&self.turn_correlation, envelope.correlation_id()) {
            (Some(correlation), None) => envelope.with_correlation_id(correlation.clone()),
            _ => envelope,
        };
        trace!(actor = %self.id, envelope_id = envelope.id(), "Queued publication");
        self.outbox.push(envelope);
    }
}

impl<A: Agent> Debug for ManagedAgent<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedAgent")
            .field("id", &self.id)
            .field("model", &self.model)
            .field("state", &self.state)
            .field("parent", &self.router.parent())
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}
