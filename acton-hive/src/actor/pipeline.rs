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

use tracing::{error, instrument, trace};

use crate::actor::handler_registry::HandlerEntry;
use crate::actor::{HandlerRegistry, ManagedAgent};
use crate::message::{AgentId, EventEnvelope};
use crate::traits::{Agent, EventModule, EventPublisher, ModuleContext};

enum EntryKind<A: Agent> {
    Handler(HandlerEntry<A>),
    Module(Arc<dyn EventModule>),
}

/// One handling unit of a built pipeline.
pub struct PipelineEntry<A: Agent> {
    name: String,
    priority: i32,
    kind: EntryKind<A>,
}

impl<A: Agent> PipelineEntry<A> {
    /// The name reported on failure.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower runs earlier.
    #[inline]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether this entry came from a dynamic module.
    pub const fn is_module(&self) -> bool {
        matches!(self.kind, EntryKind::Module(_))
    }

    /// Whether this entry wants `envelope` while running inside `actor_id`.
    pub fn can_handle(&self, envelope: &EventEnvelope, actor_id: &AgentId) -> bool {
        match &self.kind {
            EntryKind::Handler(handler) => handler.can_handle(envelope, actor_id),
            EntryKind::Module(module) => module.can_handle(envelope),
        }
    }
}

impl<A: Agent> std::fmt::Debug for PipelineEntry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineEntry")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("module", &self.is_module())
            .finish()
    }
}

/// A handler or module invocation that returned an error.
#[derive(Debug)]
pub struct HandlerFailure {
    /// The actor running the pipeline.
    pub agent_id: AgentId,
    /// The failing entry.
    pub handler_name: String,
    /// The envelope being dispatched.
    pub envelope_id: String,
    /// What the entry returned.
    pub error: anyhow::Error,
}

/// The outcome of dispatching one envelope.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Entries whose filter accepted the envelope.
    pub matched: usize,
    /// Matched entries that failed.
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// Whether every matched entry succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The priority-ordered handling sequence for one activation.
///
/// Static handlers come first and dynamic modules after them, then the whole
/// sequence is stably sorted by ascending priority, so ties keep that order.
/// Dispatch is fan-out: every entry that accepts an envelope runs, and a failing
/// entry does not stop the ones after it.
pub struct EventPipeline<A: Agent> {
    entries: Vec<PipelineEntry<A>>,
}

impl<A: Agent> Default for EventPipeline<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A: Agent> std::fmt::Debug for EventPipeline<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.entries).finish()
    }
}

impl<A: Agent> EventPipeline<A> {
    /// Merges `handlers` and `modules` into one ordered pipeline.
    pub fn build(handlers: &HandlerRegistry<A>, modules: &[Arc<dyn EventModule>]) -> Self {
        let statics = handlers.entries().iter().cloned().map(|entry| PipelineEntry {
            name: entry.name.clone(),
            priority: entry.priority,
            kind: EntryKind::Handler(entry),
        });
        let dynamics = modules.iter().map(|module| PipelineEntry {
            name: module.name().to_string(),
            priority: module.priority(),
            kind: EntryKind::Module(Arc::clone(module)),
        });

        let mut entries: Vec<PipelineEntry<A>> = statics.chain(dynamics).collect();
        // stable
        entries.sort_by_key(PipelineEntry::priority);
        Self { entries }
    }

    /// The entries in dispatch order.
    pub fn entries(&self) -> &[PipelineEntry<A>] {
        &self.entries
    }

    /// The entry priorities in dispatch order.
    pub fn priorities(&self) -> Vec<i32> {
        self.entries.iter().map(PipelineEntry::priority).collect()
    }

    /// The entry names in dispatch order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(PipelineEntry::name).collect()
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pipeline has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every accepting entry for `envelope`, in order.
    ///
    /// Module publications are handed to the agent's outbox as each module returns.
    #[instrument(skip_all, fields(actor = %agent.id(), envelope_id = envelope.id()))]
    pub async fn dispatch(&self, agent: &mut ManagedAgent<A>, envelope: &EventEnvelope) -> DispatchReport {
        let mut report = DispatchReport::default();
        for entry in &self.entries {
            if !entry.can_handle(envelope, agent.id()) {
                continue;
            }
            report.matched += 1;
            trace!(handler = %entry.name, priority = entry.priority, "Dispatching");

            let result = match &entry.kind {
                EntryKind::Handler(handler) => (handler.handler)(agent, envelope).await,
                EntryKind::Module(module) => {
                    let mut ctx = ModuleContext::new(agent.id().clone());
                    let result = module.handle(envelope, &mut ctx).await;
                    for published in ctx.into_outbox() {
                        agent.enqueue(published);
                    }
                    result
                }
            };

            if let Err(error) = result {
                error!(
                    agent_id = %agent.id(),
                    handler_name = %entry.name,
                    envelope_id = envelope.id(),
                    error = ?error,
                    "Handler failed; continuing dispatch"
                );
                report.failures.push(HandlerFailure {
                    agent_id: agent.id().clone(),
                    handler_name: entry.name.clone(),
                    envelope_id: envelope.id().to_string(),
                    error,
                });
            }
        }
        report
    }
}
