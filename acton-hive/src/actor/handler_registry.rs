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

use futures::future::{self, FutureExt};
use tracing::trace;

use crate::actor::ManagedAgent;
use crate::common::{ErasedHandler, HandlerFuture};
use crate::message::{AgentId, EventEnvelope};
use crate::traits::{Agent, AgentEvent};

/// Whether a handler sees envelopes its own actor published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SelfHandling {
    /// Runs for every matching envelope.
    Allow,
    /// Skips envelopes this actor published.
    #[default]
    Disallow,
    /// Runs only for envelopes this actor published.
    Only,
}

impl SelfHandling {
    /// Whether a handler with this policy accepts `envelope` inside actor `actor_id`.
    pub fn permits(self, envelope: &EventEnvelope, actor_id: &AgentId) -> bool {
        let own = envelope.originated_from(actor_id);
        match self {
            Self::Allow => true,
            Self::Disallow => !own,
            Self::Only => own,
        }
    }
}

/// Registration options for a typed handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerOptions {
    name: Option<String>,
    priority: i32,
    self_handling: SelfHandling,
}

impl HandlerOptions {
    /// Priority 0, self-publications skipped, name derived from the event type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the priority. Lower runs earlier.
    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the name reported on failure.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the self-handling policy.
    #[must_use]
    pub const fn self_handling(mut self, policy: SelfHandling) -> Self {
        self.self_handling = policy;
        self
    }
}

/// What a typed handler receives besides the agent.
#[derive(Debug, Clone)]
pub struct EventContext<E> {
    /// The decoded event.
    pub event: E,
    /// The envelope it arrived in.
    pub envelope: EventEnvelope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HandlerMatch {
    Type(&'static str),
    All,
}

pub(crate) struct HandlerEntry<A: Agent> {
    pub(crate) name: String,
    pub(crate) priority: i32,
    pub(crate) self_handling: SelfHandling,
    pub(crate) matcher: HandlerMatch,
    pub(crate) handler: Arc<ErasedHandler<A>>,
}

impl<A: Agent> Clone for HandlerEntry<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            priority: self.priority,
            self_handling: self.self_handling,
            matcher: self.matcher.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<A: Agent> HandlerEntry<A> {
    pub(crate) fn can_handle(&self, envelope: &EventEnvelope, actor_id: &AgentId) -> bool {
        let type_matches = match self.matcher {
            HandlerMatch::All => true,
            HandlerMatch::Type(type_name) => envelope.payload().type_identifier() == type_name,
        };
        type_matches && self.self_handling.permits(envelope, actor_id)
    }
}

/// The static handler table of one agent type.
///
/// Filled once by [`Agent::register_handlers`] and merged with dynamic modules each
/// time the agent's pipeline is built.
///
/// ```rust,ignore
/// fn register_handlers(handlers: &mut HandlerRegistry<Self>) {
///     handlers
///         .on::<Increment>(|agent, ctx| {
///             Box::pin(async move {
///                 agent.state.count += ctx.event.amount;
///                 Ok(())
///             })
///         })
///         .on_all(|_agent, envelope| {
///             Box::pin(async move {
///                 tracing::debug!(id = envelope.id(), "seen");
///                 Ok(())
///             })
///         });
/// }
/// ```
pub struct HandlerRegistry<A: Agent> {
    entries: Vec<HandlerEntry<A>>,
}

impl<A: Agent> Default for HandlerRegistry<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A: Agent> std::fmt::Debug for HandlerRegistry<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| (&entry.name, entry.priority)))
            .finish()
    }
}

impl<A: Agent> HandlerRegistry<A> {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table declared by `A`.
    pub fn for_agent() -> Self {
        let mut registry = Self::new();
        A::register_handlers(&mut registry);
        registry
    }

    /// Registers a handler for `E` with default options.
    pub fn on<E>(
        &mut self,
        handler: impl for<'a> Fn(&'a mut ManagedAgent<A>, EventContext<E>) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    ) -> &mut Self
    where
        E: AgentEvent,
    {
        self.on_with(HandlerOptions::default(), handler)
    }

    /// Registers a handler for `E`.
    pub fn on_with<E>(
        &mut self,
        options: HandlerOptions,
        handler: impl for<'a> Fn(&'a mut ManagedAgent<A>, EventContext<E>) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    ) -> &mut Self
    where
        E: AgentEvent,
    {
        let name = options
            .name
            .unwrap_or_else(|| format!("on<{}>", E::TYPE_NAME));
        trace!(handler = %name, priority = options.priority, "Registering typed handler");
        let erased = erase::<A, _>(move |agent, envelope| match envelope.payload().unpack::<E>() {
            Ok(event) => handler(
                agent,
                EventContext {
                    event,
                    envelope: envelope.clone(),
                },
            ),
            Err(err) => future::ready(Err::<(), _>(anyhow::Error::from(err))).boxed(),
        });
        self.entries.push(HandlerEntry {
            name,
            priority: options.priority,
            self_handling: options.self_handling,
            matcher: HandlerMatch::Type(E::TYPE_NAME),
            handler: Arc::new(erased),
        });
        self
    }

    /// Registers a handler for every envelope. It runs last and also sees the
    /// actor's own publications.
    pub fn on_all(
        &mut self,
        handler: impl for<'a> Fn(&'a mut ManagedAgent<A>, EventEnvelope) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    ) -> &mut Self {
        self.entries.push(HandlerEntry {
            name: "on_all".to_string(),
            priority: i32::MAX,
            self_handling: SelfHandling::Allow,
            matcher: HandlerMatch::All,
            handler: Arc::new(erase::<A, _>(move |agent, envelope| {
                handler(agent, envelope.clone())
            })),
        });
        self
    }

    /// The number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &[HandlerEntry<A>] {
        &self.entries
    }
}

// Pins the higher-ranked signature that closure inference cannot derive on its own.
fn erase<A, F>(f: F) -> F
where
    A: Agent,
    F: for<'a> Fn(&'a mut ManagedAgent<A>, &'a EventEnvelope) -> HandlerFuture<'a>
        + Send
        + Sync
        + 'static,
{
    f
}
