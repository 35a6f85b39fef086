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

use serde::{Deserialize, Serialize};

use crate::message::MessageError;

/// Controls which hierarchy relations an envelope is forwarded across after it has
/// been handled locally.
///
/// Direction never suppresses local delivery: every actor that accepts an envelope
/// dispatches it to its own pipeline first, then forwards according to this value.
/// The discriminants are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventDirection {
    /// Handled by the receiving actor only.
    #[serde(rename = "Self")]
    SelfOnly = 0,
    /// Forwarded to the parent, if any.
    Up = 1,
    /// Forwarded to every child.
    Down = 2,
    /// Forwarded to the parent and to every child.
    Both = 3,
}

impl EventDirection {
    /// Whether envelopes with this direction travel towards the parent.
    #[inline]
    pub const fn forwards_up(self) -> bool {
        matches!(self, Self::Up | Self::Both)
    }

    /// Whether envelopes with this direction travel towards the children.
    #[inline]
    pub const fn forwards_down(self) -> bool {
        matches!(self, Self::Down | Self::Both)
    }
}

impl From<EventDirection> for u8 {
    fn from(direction: EventDirection) -> Self {
        direction as Self
    }
}

impl TryFrom<u8> for EventDirection {
    type Error = MessageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::SelfOnly),
            1 => Ok(Self::Up),
            2 => Ok(Self::Down),
            3 => Ok(Self::Both),
            other => Err(MessageError::decode(
                "EventDirection",
                format!("unknown direction {other}"),
            )),
        }
    }
}
