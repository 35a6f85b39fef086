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

use thiserror::Error;

/// Errors raised while encoding, decoding, or addressing messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// A value could not be serialized into its wire form.
    #[error("failed to encode {type_name}: {reason}")]
    Encode {
        /// The type being encoded.
        type_name: String,
        /// Underlying codec error.
        reason: String,
    },
    /// Bytes could not be deserialized into the requested type.
    #[error("failed to decode {type_name}: {reason}")]
    Decode {
        /// The type being decoded.
        type_name: String,
        /// Underlying codec error.
        reason: String,
    },
    /// A payload was unpacked as a different event type than the one it carries.
    #[error("payload type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The type identifier the caller asked for.
        expected: String,
        /// The type identifier stored in the payload.
        found: String,
    },
    /// A string did not have the `ShortTypeName:RawId` shape.
    #[error("invalid agent id '{0}': expected 'ShortTypeName:RawId'")]
    InvalidAgentId(String),
}

impl MessageError {
    pub(crate) fn encode(type_name: &str, err: impl std::fmt::Display) -> Self {
        Self::Encode {
            type_name: type_name.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn decode(type_name: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            type_name: type_name.to_string(),
            reason: err.to_string(),
        }
    }
}
