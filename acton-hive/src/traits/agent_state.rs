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

use crate::message::StateEvent;

/// The persistable business state of an agent.
///
/// Event-sourced agents rebuild their state by left-folding
/// [`transition_state`](AgentState::transition_state) over their event log, starting
/// from `Default::default()`.
pub trait AgentState:
    Default + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Applies one confirmed event and returns the next state.
    ///
    /// Must be pure. The default leaves the state unchanged, so event-sourced
    /// agents override it.
    fn transition_state(self, event: &StateEvent) -> Self {
        let _ = event;
        self
    }
}
