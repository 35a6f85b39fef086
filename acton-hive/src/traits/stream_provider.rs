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
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::warn;

use crate::common::TransportError;
use crate::message::{AgentId, EventEnvelope};

/// A named multi-subscriber stream of envelopes, one per actor.
#[async_trait]
pub trait AgentStream: Debug + Send + Sync {
    /// The actor this stream is named after.
    fn actor_id(&self) -> &AgentId;

    /// Publishes to every current subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NoSubscribers`] when nobody is listening.
    async fn produce(&self, envelope: EventEnvelope) -> Result<(), TransportError>;

    /// Opens a subscription that sees envelopes produced from now on.
    fn subscribe(&self) -> StreamSubscription;

    /// The number of open subscriptions.
    fn subscriber_count(&self) -> usize;
}

/// Hands out one [`AgentStream`] per actor id.
pub trait StreamProvider: Debug + Send + Sync {
    /// The stream for `actor_id`, created on first use.
    fn get_stream(&self, actor_id: &AgentId) -> Arc<dyn AgentStream>;

    /// Drops the stream for `actor_id`. Open subscriptions end.
    fn remove_stream(&self, actor_id: &AgentId);
}

/// A receiving end of an [`AgentStream`].
#[derive(Debug)]
pub struct StreamSubscription {
    actor_id: AgentId,
    receiver: broadcast::Receiver<EventEnvelope>,
}

impl StreamSubscription {
    /// Wraps a broadcast receiver.
    pub fn new(actor_id: AgentId, receiver: broadcast::Receiver<EventEnvelope>) -> Self {
        Self { actor_id, receiver }
    }

    /// The actor the stream belongs to.
    #[inline]
    pub const fn actor_id(&self) -> &AgentId {
        &self.actor_id
    }

    /// Waits for the next envelope. Returns `None` once the stream is gone.
    ///
    /// Envelopes lost because this subscriber fell behind are skipped with a warning.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(actor = %self.actor_id, skipped, "Stream subscriber lagged; envelopes dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
