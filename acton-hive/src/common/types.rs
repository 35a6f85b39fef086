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

//! Type aliases shared across the runtime.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};

use crate::actor::{ActorCommand, ManagedAgent};
use crate::common::{ActorError, ActorHandle};
use crate::message::{AgentId, EventEnvelope};

/// The future a handler returns. It may borrow the agent for its whole run.
pub type HandlerFuture<'a> = BoxFuture<'a, anyhow::Result<()>>;

/// Crate-internal: a handler with its event type erased.
pub(crate) type ErasedHandler<A> = dyn for<'a> Fn(&'a mut ManagedAgent<A>, &'a EventEnvelope) -> HandlerFuture<'a>
    + Send
    + Sync
    + 'static;

/// Crate-internal: the sending half of an agent's command inbox.
pub(crate) type ActorSender = mpsc::Sender<ActorCommand>;

/// Crate-internal: the reply channel of a fallible actor request.
pub(crate) type Reply<T> = oneshot::Sender<Result<T, ActorError>>;

/// Crate-internal: every live actor handle keyed by id.
pub(crate) type AgentRegistry = Arc<DashMap<AgentId, ActorHandle>>;
