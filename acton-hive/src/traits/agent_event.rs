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

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A type that can travel as the payload of an [`EventEnvelope`](crate::message::EventEnvelope).
///
/// `TYPE_NAME` is the stable identifier written next to the serialized body. Usually
/// implemented through `#[agent_event]`.
pub trait AgentEvent: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// The identifier stored in the payload and in persisted state events.
    const TYPE_NAME: &'static str;
}
