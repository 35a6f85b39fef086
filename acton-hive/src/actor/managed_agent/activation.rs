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

use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};

use crate::actor::{EventPipeline, ManagedAgent};
use crate::common::{ActorError, HiveStores};
use crate::traits::{Agent, StateSnapshot};

impl<A: Agent> ManagedAgent<A> {
    pub(crate) async fn ensure_active(&mut self) -> Result<(), ActorError> {
        if self.active {
            return Ok(());
        }
        self.activate().await
    }

    /// Restores hierarchy and state, builds the pipeline and runs the activation hook.
    #[instrument(skip(self), fields(actor = %self.id))]
    pub(crate) async fn activate(&mut self) -> Result<(), ActorError> {
        if self.active {
            trace!("Already active");
            return Ok(());
        }
        let stores = self.runtime.stores().clone();

        if let Some(record) = stores.hierarchy_store.load(&self.id).await? {
            self.router.restore(record);
        }
        self.state = self.restore_state(&stores).await?;
        self.rebuild_pipeline();

        self.model
            .on_activate(&self.state)
            .await
            .map_err(|e| ActorError::Activation {
                agent_id: self.id.clone(),
                reason: e.to_string(),
            })?;
        self.active = true;
        debug!(
            parent = ?self.router.parent(),
            children = self.router.children().len(),
            version = ?self.current_version(),
            entries = self.pipeline.len(),
            "Agent activated"
        );
        Ok(())
    }

    /// Runs the deactivation hook and persists state and hierarchy.
    #[instrument(skip(self), fields(actor = %self.id))]
    pub(crate) async fn deactivate(&mut self) -> Result<(), ActorError> {
        if !self.active {
            trace!("Already inactive");
            return Ok(());
        }
        if let Err(e) = self.model.on_deactivate(&self.state).await {
            warn!(error = ?e, "Deactivation hook failed");
        }

        match &self.event_sourcing {
            Some(behavior) => {
                if !behavior.pending_events().is_empty() {
                    warn!(
                        pending = behavior.pending_events().len(),
                        "Deactivating with unconfirmed events; they are discarded"
                    );
                }
                let version = behavior.current_version();
                if version > 0 {
                    self.write_state(version).await?;
                }
            }
            None => self.write_state(0).await?,
        }
        self.persist_hierarchy().await?;

        self.active = false;
        self.pipeline = Arc::new(EventPipeline::default());
        debug!("Agent deactivated");
        Ok(())
    }

    async fn restore_state(&mut self, stores: &HiveStores) -> Result<A::State, ActorError> {
        let snapshot = stores.state_store.load(&self.id).await?;
        match self.event_sourcing.as_mut() {
            Some(behavior) => match snapshot {
                Some(snapshot) => {
                    let state: A::State = snapshot.restore()?;
                    Ok(behavior.restore(state, snapshot.version).await?)
                }
                None => Ok(behavior.replay().await?.unwrap_or_default()),
            },
            None => match snapshot {
                Some(snapshot) => Ok(snapshot.restore()?),
                None => Ok(std::mem::take(&mut self.state)),
            },
        }
    }

    pub(crate) fn rebuild_pipeline(&mut self) {
        let mut modules = self.model.modules();
        modules.extend(self.registered_modules.iter().cloned());
        self.pipeline = Arc::new(EventPipeline::build(&self.handlers, &modules));
        trace!(actor = %self.id, names = ?self.pipeline.names(), "Pipeline built");
    }

    pub(crate) async fn persist_hierarchy(&self) -> Result<(), ActorError> {
        self.runtime
            .stores()
            .hierarchy_store
            .save(&self.id, self.router.to_record())
            .await?;
        Ok(())
    }

    async fn write_state(&self, version: u64) -> Result<(), ActorError> {
        let snapshot = StateSnapshot::capture(self.id.clone(), version, &self.state)?;
        self.runtime.stores().state_store.save(snapshot).await?;
        trace!(actor = %self.id, version, "State saved");
        Ok(())
    }

    /// Saves plain state after a turn. Failures are logged, not returned.
    pub(crate) async fn persist_state(&self) {
        if let Err(e) = self.write_state(0).await {
            warn!(actor = %self.id, error = %e, "Failed to persist state after turn");
        }
    }

    /// Saves a snapshot of event-sourced state. Failures are logged, not returned.
    pub(crate) async fn save_snapshot(&self, version: u64) {
        match self.write_state(version).await {
            Ok(()) => debug!(actor = %self.id, version, "Snapshot written"),
            Err(e) => warn!(actor = %self.id, version, error = %e, "Failed to write snapshot"),
        }
    }
}
