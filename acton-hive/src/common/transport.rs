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
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{instrument, trace, warn};

use crate::common::{AgentRegistry, TransportError};
use crate::message::{AgentId, EventEnvelope, TransportMessage};
use crate::traits::{ActorTransport, StreamProvider};

/// Delivers by producing onto the target actor's stream.
///
/// Each hosted actor consumes its own stream, so a target that is not hosted yields
/// [`TransportError::NoSubscribers`].
#[derive(Debug, Clone)]
pub struct StreamTransport {
    streams: Arc<dyn StreamProvider>,
}

impl StreamTransport {
    /// A transport over `streams`.
    pub fn new(streams: Arc<dyn StreamProvider>) -> Self {
        Self { streams }
    }
}

#[async_trait]
impl ActorTransport for StreamTransport {
    async fn send(&self, target: &AgentId, envelope: EventEnvelope) -> Result<(), TransportError> {
        self.streams.get_stream(target).produce(envelope).await
    }
}

/// Delivers through a message backbone carrying encoded [`TransportMessage`]s.
///
/// A consumer task decodes each message and enqueues the envelope into the target's
/// `HandleEvent`. The backbone here is a process-local queue; the encoding is the
/// same one a remote broker would carry.
#[derive(Debug, Clone)]
pub struct BrokerTransport {
    queue: mpsc::Sender<Vec<u8>>,
    registry: AgentRegistry,
}

impl BrokerTransport {
    /// Starts the consumer on `tracker` and returns the producing side.
    pub(crate) fn start(
        registry: AgentRegistry,
        streams: Arc<dyn StreamProvider>,
        capacity: usize,
        tracker: &TaskTracker,
        cancellation_token: CancellationToken,
    ) -> Self {
        let (queue, mut backbone) = mpsc::channel::<Vec<u8>>(capacity.max(1));
        let consumer_registry = Arc::clone(&registry);
        tracker.spawn(async move {
            loop {
                tokio::select! {
                    () = cancellation_token.cancelled() => break,
                    incoming = backbone.recv() => {
                        let Some(bytes) = incoming else { break };
                        deliver(&consumer_registry, streams.as_ref(), &bytes).await;
                    }
                }
            }
            trace!("Broker consumer stopped");
        });
        Self { queue, registry }
    }
}

#[async_trait]
impl ActorTransport for BrokerTransport {
    #[instrument(skip(self, envelope), fields(envelope_id = envelope.id()))]
    async fn send(&self, target: &AgentId, envelope: EventEnvelope) -> Result<(), TransportError> {
        if !self.registry.contains_key(target) {
            return Err(TransportError::TargetNotFound(target.clone()));
        }
        let bytes = TransportMessage::wrap(target, &envelope)?.to_bytes()?;
        self.queue
            .send(bytes)
            .await
            .map_err(|_| TransportError::ChannelClosed(target.clone()))
    }
}

async fn deliver(registry: &AgentRegistry, streams: &dyn StreamProvider, bytes: &[u8]) {
    let opened = TransportMessage::from_bytes(bytes).and_then(|message| message.open());
    let (target, envelope) = match opened {
        Ok(opened) => opened,
        Err(e) => {
            warn!(error = %e, "Dropping undecodable transport message");
            return;
        }
    };

    let Some(handle) = registry.get(&target).map(|entry| entry.value().clone()) else {
        warn!(target = %target, "Dropping transport message for unknown actor");
        return;
    };
    if let Err(e) = handle.enqueue(envelope.clone()).await {
        warn!(target = %target, error = %e, "Failed to enqueue delivered envelope");
        return;
    }
    // observers only; the actor itself was fed above
    let _ = streams.get_stream(&target).produce(envelope).await;
}
