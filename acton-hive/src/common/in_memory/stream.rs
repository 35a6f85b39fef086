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

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::trace;

use crate::common::config::CONFIG;
use crate::common::TransportError;
use crate::message::{AgentId, EventEnvelope};
use crate::traits::{AgentStream, StreamProvider, StreamSubscription};

/// A broadcast-backed [`AgentStream`].
#[derive(Debug)]
pub struct InMemoryStream {
    actor_id: AgentId,
    sender: broadcast::Sender<EventEnvelope>,
}

impl InMemoryStream {
    fn new(actor_id: AgentId, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { actor_id, sender }
    }
}

#[async_trait]
impl AgentStream for InMemoryStream {
    fn actor_id(&self) -> &AgentId {
        &self.actor_id
    }

    async fn produce(&self, envelope: EventEnvelope) -> Result<(), TransportError> {
        let receivers = self
            .sender
            .send(envelope)
            .map_err(|_| TransportError::NoSubscribers(self.actor_id.clone()))?;
        trace!(stream = %self.actor_id, receivers, "Produced envelope");
        Ok(())
    }

    fn subscribe(&self) -> StreamSubscription {
        StreamSubscription::new(self.actor_id.clone(), self.sender.subscribe())
    }

    fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A [`StreamProvider`] handing out one [`InMemoryStream`] per actor id.
#[derive(Debug)]
pub struct InMemoryStreamProvider {
    streams: DashMap<AgentId, Arc<InMemoryStream>>,
    capacity: usize,
}

impl Default for InMemoryStreamProvider {
    fn default() -> Self {
        Self::with_capacity(CONFIG.limits.stream_capacity)
    }
}

impl InMemoryStreamProvider {
    /// Creates a provider whose streams buffer `capacity` envelopes per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            streams: DashMap::new(),
            capacity,
        }
    }
}

impl StreamProvider for InMemoryStreamProvider {
    fn get_stream(&self, actor_id: &AgentId) -> Arc<dyn AgentStream> {
        let stream = self
            .streams
            .entry(actor_id.clone())
            .or_insert_with(|| Arc::new(InMemoryStream::new(actor_id.clone(), self.capacity)))
            .value()
            .clone();
        stream
    }

    fn remove_stream(&self, actor_id: &AgentId) {
        self.streams.remove(actor_id);
    }
}
