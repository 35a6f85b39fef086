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
#![allow(unused)]

use acton_hive::prelude::*;

#[agent_event]
pub struct Increment {
    pub amount: i64,
}

#[agent_event(name = "counter.reset")]
pub struct Reset;

// carried through the hierarchy by the node tests
#[agent_event]
pub struct Ping {
    pub label: String,
}

// published by a node in response to a ping
#[agent_event]
pub struct Pong {
    pub label: String,
}

#[agent_event]
pub struct Deposit {
    pub amount: i64,
}

#[agent_event]
pub struct Deposited {
    pub amount: i64,
}
