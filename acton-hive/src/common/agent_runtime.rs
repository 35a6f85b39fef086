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

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use futures::future::join_all;
use tokio::time::timeout;
use tracing::{debug, error, instrument, trace, warn};

use crate::actor::{AgentConfig, ManagedAgent};
use crate::common::config::{HiveConfig, TransportKind};
use crate::common::hive_inner::HiveInner;
use crate::common::{ActorError, ActorHandle, HiveStores, RunManager};
use crate::message::AgentId;
use crate::traits::{ActorTransport, Agent, AgentActor, StreamSubscription};

/// A running hive: the registry of hosted actors and the collaborators they share.
///
/// Obtained from [`HiveApp`](crate::common::HiveApp). Cheap to clone; every clone
/// refers to the same hive.
#[derive(Debug, Clone)]
pub struct AgentRuntime(pub(crate) Arc<HiveInner>);

impl AgentRuntime {
    /// The configuration this hive runs with.
    #[inline]
    pub fn config(&self) -> &HiveConfig {
        &self.0.config
    }

    /// The stores and streams this hive runs on.
    #[inline]
    pub fn stores(&self) -> &HiveStores {
        &self.0.stores
    }

    /// The transport actors forward through.
    pub fn transport(&self) -> Arc<dyn ActorTransport> {
        Arc::clone(&self.0.transport)
    }

    /// The hive's run manager.
    pub fn run_manager(&self) -> Arc<RunManager> {
        Arc::clone(&self.0.run_manager)
    }

    /// The number of hosted actors.
    #[inline]
    pub fn agent_count(&self) -> usize {
        self.0.registry.len()
    }

    /// The handle of a hosted actor.
    pub fn get(&self, id: &AgentId) -> Option<ActorHandle> {
        self.0.registry.get(id).map(|entry| entry.value().clone())
    }

    fn require(&self, id: &AgentId) -> Result<ActorHandle, ActorError> {
        self.get(id).ok_or_else(|| ActorError::NotFound(id.clone()))
    }

    /// Hosts `model` with a random raw id and no parent.
    pub async fn spawn_agent<A: Agent>(&self, model: A) -> Result<ActorHandle, ActorError> {
        self.spawn_agent_with_config(model, AgentConfig::new()).await
    }

    /// Hosts `model` as configured. The agent activates on its first request.
    ///
    /// # Errors
    ///
    /// [`ActorError::AlreadyRegistered`] when the id is taken, or any error from
    /// linking under the configured parent.
    #[instrument(skip(self, model, config), fields(agent_type = std::any::type_name::<A>()))]
    pub async fn spawn_agent_with_config<A: Agent>(
        &self,
        model: A,
        config: AgentConfig,
    ) -> Result<ActorHandle, ActorError> {
        let id = config.resolve_id::<A>();
        let handle = match self.0.registry.entry(id.clone()) {
            Entry::Occupied(_) => return Err(ActorError::AlreadyRegistered(id)),
            Entry::Vacant(vacant) => {
                let (agent, inbox) = ManagedAgent::new(id.clone(), model, &config, self.clone());
                let handle = agent.start(inbox);
                vacant.insert(handle.clone());
                handle
            }
        };
        if self.0.config.transport.kind == TransportKind::Stream {
            self.start_stream_consumer(handle.clone());
        }
        debug!(actor = %id, "Agent spawned");

        if let Some(parent) = config.parent() {
            self.link(parent, &id).await?;
        }
        Ok(handle)
    }

    /// Feeds everything produced on the actor's stream into its inbox.
    fn start_stream_consumer(&self, handle: ActorHandle) {
        let mut subscription = self.stores().streams.get_stream(&handle.id).subscribe();
        let cancellation_token = self.0.cancellation_token.clone();
        self.0.tracker.spawn(async move {
            loop {
                tokio::select! {
                    () = cancellation_token.cancelled() => break,
                    incoming = subscription.recv() => {
                        let Some(envelope) = incoming else { break };
                        if let Err(e) = handle.enqueue(envelope).await {
                            trace!(actor = %handle.id, error = %e, "Stream consumer stopping");
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Opens a subscription to an actor's stream.
    ///
    /// It sees every envelope delivered to the actor through the transport from now on.
    pub fn subscribe(&self, id: &AgentId) -> StreamSubscription {
        self.stores().streams.get_stream(id).subscribe()
    }

    /// Makes `child` a child of `parent`, detaching it from any previous parent.
    ///
    /// # Errors
    ///
    /// [`ActorError::NotFound`] for an unknown id, or [`ActorError::HierarchyCycle`]
    /// when `child` is `parent` or one of its ancestors.
    #[instrument(skip(self))]
    pub async fn link(&self, parent: &AgentId, child: &AgentId) -> Result<(), ActorError> {
        let parent_handle = self.require(parent)?;
        let child_handle = self.require(child)?;

        let mut visited = HashSet::new();
        let mut cursor = Some(parent.clone());
        while let Some(current) = cursor {
            if &current == child {
                return Err(ActorError::HierarchyCycle {
                    parent: parent.clone(),
                    child: child.clone(),
                });
            }
            if !visited.insert(current.clone()) {
                break;
            }
            cursor = match self.get(&current) {
                Some(handle) => handle.get_parent_id().await?,
                None => None,
            };
        }

        if let Some(previous) = child_handle.get_parent_id().await? {
            if &previous != parent {
                if let Some(previous_handle) = self.get(&previous) {
                    previous_handle.remove_child(child.clone()).await?;
                }
            }
        }
        parent_handle.add_child(child.clone()).await?;
        child_handle.set_parent(Some(parent.clone())).await?;
        debug!("Linked");
        Ok(())
    }

    /// Removes the link between `parent` and `child`. Missing links are ignored.
    #[instrument(skip(self))]
    pub async fn unlink(&self, parent: &AgentId, child: &AgentId) -> Result<(), ActorError> {
        self.require(parent)?.remove_child(child.clone()).await?;
        let child_handle = self.require(child)?;
        if child_handle.get_parent_id().await?.as_ref() == Some(parent) {
            child_handle.set_parent(None).await?;
        }
        debug!("Unlinked");
        Ok(())
    }

    /// Stops an actor, detaches it from its relatives and forgets it.
    ///
    /// Its hierarchy record is always removed. With `purge` its state, event log
    /// and deduplication window are deleted too; otherwise respawning the same id
    /// restores them and keeps skipping envelope ids it already processed.
    #[instrument(skip(self))]
    pub async fn destroy_agent(&self, id: &AgentId, purge: bool) -> Result<(), ActorError> {
        let handle = self.require(id)?;
        let parent = handle.get_parent_id().await?;
        let children = handle.get_children_ids().await?;

        if let Some(parent_handle) = parent.as_ref().and_then(|parent| self.get(parent)) {
            if let Err(e) = parent_handle.remove_child(id.clone()).await {
                warn!(parent = %parent_handle.id, error = %e, "Failed to detach from parent");
            }
        }
        for child in &children {
            if let Some(child_handle) = self.get(child) {
                if let Err(e) = child_handle.set_parent(None).await {
                    warn!(child = %child, error = %e, "Failed to detach child");
                }
            }
        }

        handle.stop().await?;
        self.0.registry.remove(id);
        self.stores().streams.remove_stream(id);
        self.stores().hierarchy_store.delete(id).await?;
        if purge {
            self.stores().state_store.delete(id).await?;
            self.stores().event_store.delete_events(id).await?;
            self.stores().deduplicator.forget_scope(id.as_str()).await;
        }
        debug!(children = children.len(), "Agent destroyed");
        Ok(())
    }

    /// Stops every actor, then the hive's own tasks.
    ///
    /// Actors stop concurrently. When the system shutdown timeout expires the
    /// remaining tasks are cancelled and an error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown timed out.
    pub async fn shutdown_all(&self) -> anyhow::Result<()> {
        trace!("Stopping all actors");
        let handles: Vec<ActorHandle> = self
            .0
            .registry
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let stop_futures = handles.iter().map(|handle| async move {
            if let Err(e) = handle.stop().await {
                error!("Error stopping actor {}: {}", handle.id, e);
            }
        });

        let limit = self.0.config.system_shutdown_timeout();
        let timed_out = timeout(limit, join_all(stop_futures)).await.is_err();
        if timed_out {
            error!(
                "System-wide shutdown timeout expired after {:?}. Forcefully cancelling remaining tasks.",
                limit
            );
        }

        self.0.cancellation_token.cancel();
        self.0.tracker.close();
        self.0.tracker.wait().await;
        self.0.registry.clear();

        if timed_out {
            return Err(anyhow::anyhow!(
                "Timeout while waiting for actors to shut down after {limit:?}"
            ));
        }
        trace!("System shutdown complete.");
        Ok(())
    }
}
