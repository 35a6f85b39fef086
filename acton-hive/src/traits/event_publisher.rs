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

use crate::message::{AgentId, EventDirection, EventEnvelope, MessageError};
use crate::traits::AgentEvent;

/// The publisher contract available to handlers and modules.
///
/// Published envelopes are stamped with the publisher's id and queued. The owning
/// actor routes them once the current dispatch completes, so publishing never
/// re-enters the pipeline that is running.
pub trait EventPublisher {
    /// The id stamped on published envelopes.
    fn publisher_id(&self) -> &AgentId;

    /// Queues a fully built envelope.
    fn enqueue(&mut self, envelope: EventEnvelope);

    /// Packs `event` into a new envelope and queues it, returning the envelope id.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Encode`] if the event cannot be serialized.
    fn publish_event<E: AgentEvent>(
        &mut self,
        event: &E,
        direction: EventDirection,
    ) -> Result<String, MessageError> {
        let envelope =
            EventEnvelope::from_event(event, direction)?.with_publisher(self.publisher_id().clone());
        let id = envelope.id().to_string();
        self.enqueue(envelope);
        Ok(id)
    }
}
