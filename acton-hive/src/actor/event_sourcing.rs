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
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};

use crate::common::StoreError;
use crate::message::{AgentId, EventPayload, MessageError, StateEvent};
use crate::traits::{AgentEvent, AgentState, EventStore};

/// Durable, version-checked state mutation for one agent.
///
/// Raised events wait in memory until [`confirm_events`](Self::confirm_events)
/// appends them with optimistic concurrency. The owning actor processes one turn at
/// a time, so no internal synchronization is needed.
pub struct EventSourcingBehavior<S: AgentState> {
    agent_id: AgentId,
    store: Arc<dyn EventStore>,
    current_version: u64,
    pending: Vec<EventPayload>,
    _state: PhantomData<fn() -> S>,
}

impl<S: AgentState> fmt::Debug for EventSourcingBehavior<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSourcingBehavior")
            .field("agent_id", &self.agent_id)
            .field("current_version", &self.current_version)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl<S: AgentState> EventSourcingBehavior<S> {
    /// A behavior at version 0 with nothing pending.
    pub fn new(agent_id: AgentId, store: Arc<dyn EventStore>) -> Self {
        Self {
            agent_id,
            store,
            current_version: 0,
            pending: Vec::new(),
            _state: PhantomData,
        }
    }

    /// The agent whose log this behavior writes.
    #[inline]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// The version of the last confirmed or replayed event.
    #[inline]
    pub const fn current_version(&self) -> u64 {
        self.current_version
    }

    /// Events raised but not yet confirmed, in raise order.
    #[inline]
    pub fn pending_events(&self) -> &[EventPayload] {
        &self.pending
    }

    /// Buffers an already packed event. No I/O happens.
    pub fn raise_event(&mut self, payload: EventPayload) {
        trace!(agent = %self.agent_id, event_type = payload.type_identifier(), "Raised event");
        self.pending.push(payload);
    }

    /// Packs and buffers `event`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Encode`] if the event cannot be serialized.
    pub fn raise<E: AgentEvent>(&mut self, event: &E) -> Result<(), MessageError> {
        self.raise_event(EventPayload::pack(event)?);
        Ok(())
    }

    /// Appends every pending event to the store.
    ///
    /// Pending events get versions `current + 1 ..` in raise order and are appended
    /// with `expected_version = current`. On success the version advances, the
    /// buffer is cleared and the committed events are returned. On any failure,
    /// including [`StoreError::VersionConflict`], version and buffer stay untouched
    /// so the caller can reconcile and retry.
    #[instrument(skip(self), fields(agent = %self.agent_id, pending = self.pending.len()))]
    pub async fn confirm_events(&mut self) -> Result<Vec<StateEvent>, StoreError> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let events: Vec<StateEvent> = (self.current_version + 1..)
            .zip(self.pending.iter())
            .map(|(version, payload)| StateEvent::new(self.agent_id.clone(), version, payload.clone()))
            .collect();

        match self
            .store
            .append(&self.agent_id, events.clone(), self.current_version)
            .await
        {
            Ok(new_version) => {
                debug!(from = self.current_version, to = new_version, "Confirmed events");
                self.current_version = new_version;
                self.pending.clear();
                Ok(events)
            }
            Err(err) => {
                warn!(error = %err, "Confirm failed; pending events kept");
                Err(err)
            }
        }
    }

    /// Reads the events logged after `version`, without touching this behavior.
    pub async fn events_after(&self, version: u64) -> Result<Vec<StateEvent>, StoreError> {
        self.store.get_events(&self.agent_id, Some(version)).await
    }

    /// Moves the confirmed version forward after the caller folded newer events
    /// itself. Pending events are kept.
    pub(crate) fn advance_to(&mut self, version: u64) {
        self.current_version = self.current_version.max(version);
    }

    /// Rebuilds state from the whole log.
    ///
    /// Returns `None` when the log is empty, which means no state has been persisted
    /// yet. Otherwise folds [`AgentState::transition_state`] over every event from
    /// `S::default()` and moves the version to the last event.
    #[instrument(skip(self), fields(agent = %self.agent_id))]
    pub async fn replay(&mut self) -> Result<Option<S>, StoreError> {
        let events = self.store.get_events(&self.agent_id, None).await?;
        let Some(last) = events.last() else {
            trace!("No events to replay");
            return Ok(None);
        };
        self.current_version = last.version;
        debug!(version = self.current_version, count = events.len(), "Replayed events");
        Ok(Some(fold_events(S::default(), &events)))
    }

    /// Continues from a snapshot taken at `snapshot_version`, folding only the
    /// events after it.
    #[instrument(skip(self, snapshot), fields(agent = %self.agent_id))]
    pub async fn restore(&mut self, snapshot: S, snapshot_version: u64) -> Result<S, StoreError> {
        let events = self
            .store
            .get_events(&self.agent_id, Some(snapshot_version))
            .await?;
        self.current_version = events.last().map_or(snapshot_version, |event| event.version);
        debug!(
            snapshot_version,
            version = self.current_version,
            count = events.len(),
            "Restored from snapshot"
        );
        Ok(fold_events(snapshot, &events))
    }
}

/// Left-folds `events` into `state` in the order given.
pub fn fold_events<S: AgentState>(state: S, events: &[StateEvent]) -> S {
    events
        .iter()
        .fold(state, |state, event| state.transition_state(event))
}
