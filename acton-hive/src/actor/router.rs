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

use std::collections::{BTreeSet, HashSet};
use std::future::Future;

use derive_new::new;
use futures::future::join_all;
use tracing::{error, instrument, trace};

use crate::common::TransportError;
use crate::message::{AgentId, EventEnvelope};
use crate::traits::HierarchyRecord;

/// Directional propagation of envelopes across one actor's hierarchy links.
///
/// The router owns the actor's parent and children. It appends the actor to an
/// envelope's publisher chain before local handling and forwards only to relatives
/// that are not in the chain yet, which keeps every propagation tree loop free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRouter {
    actor_id: AgentId,
    parent: Option<AgentId>,
    children: BTreeSet<AgentId>,
}

/// What [`EventRouter::route`] did with an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The actor was already in the publisher chain. Nothing happened.
    AlreadyPublished,
    /// The envelope was handled locally and forwarded.
    Routed(ForwardReport),
}

/// The result of forwarding one envelope to the actor's relatives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardReport {
    /// Targets that accepted the envelope.
    pub delivered: Vec<AgentId>,
    /// Targets that did not, each with its own error.
    pub failures: Vec<ForwardFailure>,
}

impl ForwardReport {
    /// Whether every target accepted the envelope.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A forwarding attempt that failed for one target.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct ForwardFailure {
    /// The relative the envelope was meant for.
    pub target: AgentId,
    /// The id of the envelope.
    pub envelope_id: String,
    /// Why the hand-off failed.
    pub error: TransportError,
}

impl EventRouter {
    /// A router for an actor with no relatives.
    pub fn new(actor_id: AgentId) -> Self {
        Self {
            actor_id,
            parent: None,
            children: BTreeSet::new(),
        }
    }

    /// The actor this router belongs to.
    #[inline]
    pub const fn actor_id(&self) -> &AgentId {
        &self.actor_id
    }

    /// The parent, if any.
    #[inline]
    pub const fn parent(&self) -> Option<&AgentId> {
        self.parent.as_ref()
    }

    /// The children, in id order.
    #[inline]
    pub const fn children(&self) -> &BTreeSet<AgentId> {
        &self.children
    }

    /// Replaces the parent link.
    pub fn set_parent(&mut self, parent: Option<AgentId>) {
        self.parent = parent;
    }

    /// Adds a child. Returns `false` if it was already linked.
    pub fn add_child(&mut self, child: AgentId) -> bool {
        self.children.insert(child)
    }

    /// Removes a child. Returns `false` if it was not linked.
    pub fn remove_child(&mut self, child: &AgentId) -> bool {
        self.children.remove(child)
    }

    /// The links in their persisted form.
    pub fn to_record(&self) -> HierarchyRecord {
        HierarchyRecord {
            parent_id: self.parent.clone(),
            children_ids: self.children.clone(),
        }
    }

    /// Replaces all links with a persisted record.
    pub fn restore(&mut self, record: HierarchyRecord) {
        self.parent = record.parent_id;
        self.children = record.children_ids;
    }

    /// Loop guard. Appends this actor to the publisher chain and returns `true`, or
    /// returns `false` without touching the envelope if the actor is already in it.
    pub fn enter(&self, envelope: &mut EventEnvelope) -> bool {
        if envelope.has_publisher(&self.actor_id) {
            trace!(actor = %self.actor_id, envelope_id = envelope.id(), "Already a publisher; skipping");
            return false;
        }
        envelope.append_publisher(&self.actor_id);
        true
    }

    /// The relatives `envelope` should be forwarded to, given its direction and
    /// current publisher chain. The parent comes first, then children in id order.
    pub fn targets(&self, envelope: &EventEnvelope) -> Vec<AgentId> {
        let publishers: HashSet<AgentId> = envelope.publisher_set();
        let direction = envelope.direction();
        let up = self
            .parent
            .iter()
            .filter(|_| direction.forwards_up())
            .filter(|parent| !publishers.contains(*parent));
        let down = self
            .children
            .iter()
            .filter(|_| direction.forwards_down())
            .filter(|child| !publishers.contains(*child));
        up.chain(down).cloned().collect()
    }

    /// Forwards `envelope` to every target concurrently.
    ///
    /// Each target receives its own copy of the envelope, so branches never share
    /// metadata. A failing target is logged and reported without affecting the
    /// others.
    #[instrument(skip(self, envelope, send), fields(actor = %self.actor_id, envelope_id = envelope.id()))]
    pub async fn forward<F, Fut>(&self, envelope: &EventEnvelope, send: F) -> ForwardReport
    where
        F: Fn(AgentId, EventEnvelope) -> Fut,
        Fut: Future<Output = Result<(), TransportError>>,
    {
        let targets = self.targets(envelope);
        if targets.is_empty() {
            return ForwardReport::default();
        }
        trace!(count = targets.len(), "Forwarding envelope");

        let attempts = targets.into_iter().map(|target| {
            let delivery = send(target.clone(), envelope.clone());
            async move { (target, delivery.await) }
        });

        let mut report = ForwardReport::default();
        for (target, result) in join_all(attempts).await {
            match result {
                Ok(()) => report.delivered.push(target),
                Err(error) => {
                    error!(
                        actor = %self.actor_id,
                        target = %target,
                        envelope_id = envelope.id(),
                        error = %error,
                        "Failed to forward envelope"
                    );
                    report
                        .failures
                        .push(ForwardFailure::new(target, envelope.id().to_string(), error));
                }
            }
        }
        report
    }

    /// Routes `envelope` through this actor: loop guard, one local delivery through
    /// `handle_self`, then forwarding through `send_to_actor` per direction.
    ///
    /// Local delivery happens whatever the direction; direction only decides which
    /// relatives receive a copy afterwards.
    pub async fn route<H, HFut, S, SFut>(
        &self,
        envelope: &mut EventEnvelope,
        handle_self: H,
        send_to_actor: S,
    ) -> RouteOutcome
    where
        H: FnOnce(EventEnvelope) -> HFut,
        HFut: Future<Output = ()>,
        S: Fn(AgentId, EventEnvelope) -> SFut,
        SFut: Future<Output = Result<(), TransportError>>,
    {
        if !self.enter(envelope) {
            return RouteOutcome::AlreadyPublished;
        }
        handle_self(envelope.clone()).await;
        RouteOutcome::Routed(self.forward(envelope, send_to_actor).await)
    }
}
