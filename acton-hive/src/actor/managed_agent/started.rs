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

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, instrument, trace};

use crate::actor::{ActorCommand, ManagedAgent};
use crate::common::ActorError;
use crate::message::EventEnvelope;
use crate::traits::Agent;

impl<A: Agent> ManagedAgent<A> {
    /// The actor task: serves commands one at a time until terminated, cancelled,
    /// or every handle is gone.
    #[instrument(skip_all, fields(actor = %self.id))]
    pub(crate) async fn wake(mut self, mut inbox: Receiver<ActorCommand>) {
        let cancel_token = self.handle.cancellation_token.clone();
        loop {
            tokio::select! {
                () = cancel_token.cancelled() => {
                    trace!("Forceful cancellation triggered");
                    break;
                }
                incoming = inbox.recv() => {
                    let Some(command) = incoming else { break };
                    trace!(command = command.name(), "Received command");
                    if self.process(command).await.is_break() {
                        inbox.close();
                        break;
                    }
                }
            }
        }

        if self.active {
            if let Err(e) = self.deactivate().await {
                error!(error = %e, "Failed to persist agent while stopping");
            }
        }
        trace!("Agent stopped");
    }

    async fn process(&mut self, command: ActorCommand) -> ControlFlow<()> {
        match command {
            ActorCommand::Activate(reply) => {
                let _ = reply.send(self.activate().await);
            }
            ActorCommand::Deactivate(reply) => {
                let _ = reply.send(self.deactivate().await);
            }
            ActorCommand::HandleEvent { envelope, reply } => {
                let result = self.handle_envelope(envelope).await;
                if let Err(e) = &result {
                    error!(error = %e, "Failed to handle envelope");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            ActorCommand::Configure { config, reply } => {
                let result = self
                    .model
                    .configure(config)
                    .await
                    .map_err(|e| ActorError::Configuration {
                        agent_id: self.id.clone(),
                        reason: e.to_string(),
                    });
                let _ = reply.send(result);
            }
            ActorCommand::ParentId(reply) => {
                let result = self
                    .ensure_active()
                    .await
                    .map(|()| self.router.parent().cloned());
                let _ = reply.send(result);
            }
            ActorCommand::ChildrenIds(reply) => {
                let result = self.ensure_active().await.map(|()| self.children_ids());
                let _ = reply.send(result);
            }
            ActorCommand::Description(reply) => {
                let _ = reply.send(self.model.description());
            }
            ActorCommand::TypeName(reply) => {
                let _ = reply.send(std::any::type_name::<A>().to_string());
            }
            ActorCommand::CurrentVersion(reply) => {
                let _ = reply.send(self.current_version());
            }
            ActorCommand::SetParent { parent, reply } => {
                let result = self.update_hierarchy(|router| router.set_parent(parent)).await;
                let _ = reply.send(result);
            }
            ActorCommand::AddChild { child, reply } => {
                let result = self
                    .update_hierarchy(|router| {
                        router.add_child(child);
                    })
                    .await;
                let _ = reply.send(result);
            }
            ActorCommand::RemoveChild { child, reply } => {
                let result = self
                    .update_hierarchy(|router| {
                        router.remove_child(&child);
                    })
                    .await;
                let _ = reply.send(result);
            }
            ActorCommand::RegisterModule { module, reply } => {
                debug!(module = module.name(), priority = module.priority(), "Registering module");
                self.registered_modules.push(module);
                if self.active {
                    self.rebuild_pipeline();
                }
                let _ = reply.send(Ok(()));
            }
            ActorCommand::Terminate(reply) => {
                trace!("Terminate received");
                let _ = reply.send(self.deactivate().await);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn update_hierarchy(
        &mut self,
        change: impl FnOnce(&mut crate::actor::EventRouter),
    ) -> Result<(), ActorError> {
        self.ensure_active().await?;
        change(&mut self.router);
        self.persist_hierarchy().await
    }

    /// Handles one inbound envelope and then every envelope published while doing so.
    async fn handle_envelope(&mut self, envelope: EventEnvelope) -> Result<(), ActorError> {
        self.ensure_active().await?;
        let mut queue = VecDeque::from([envelope]);
        while let Some(envelope) = queue.pop_front() {
            self.run_turn(envelope).await;
            queue.extend(self.outbox.drain(..));
        }
        Ok(())
    }

    /// Dedup, loop guard, local dispatch, state persistence, then forwarding.
    #[instrument(skip_all, fields(envelope_id = envelope.id(), direction = ?envelope.direction()))]
    async fn run_turn(&mut self, mut envelope: EventEnvelope) {
        let behavior = self.runtime.config().behavior.clone();

        if behavior.deduplicate_events
            && !self
                .runtime
                .stores()
                .deduplicator
                .try_mark_processed(self.id.as_str(), envelope.id())
                .await
        {
            debug!("Duplicate envelope skipped");
            return;
        }

        if !self.router.enter(&mut envelope) {
            return;
        }

        self.turn_correlation = envelope.correlation_id().map(str::to_string);
        let pipeline = Arc::clone(&self.pipeline);
        let report = pipeline.dispatch(self, &envelope).await;
        trace!(matched = report.matched, failures = report.failures.len(), "Dispatch finished");

        if report.matched > 0 && self.event_sourcing.is_none() && behavior.persist_state_after_turn {
            self.persist_state().await;
        }

        let transport = Arc::clone(&self.runtime.0.transport);
        let forwarded = self
            .router
            .forward(&envelope, |target, copy| {
                let transport = Arc::clone(&transport);
                async move { transport.send(&target, copy).await }
            })
            .await;
        if !forwarded.is_complete() {
            debug!(
                delivered = forwarded.delivered.len(),
                failed = forwarded.failures.len(),
                "Forwarding partially failed"
            );
        }
        self.turn_correlation = None;
    }
}
