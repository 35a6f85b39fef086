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

use async_trait::async_trait;

use crate::common::TransportError;
use crate::message::{AgentId, EventEnvelope};

/// Delivers an envelope to another actor, in-process or remote.
#[async_trait]
pub trait ActorTransport: Debug + Send + Sync {
    /// Hands `envelope` to `target`. Returns once the hand-off is accepted, not
    /// once the target has processed it.
    async fn send(&self, target: &AgentId, envelope: EventEnvelope) -> Result<(), TransportError>;
}
