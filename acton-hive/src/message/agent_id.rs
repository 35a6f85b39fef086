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

use std::fmt;
use std::str::FromStr;

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::config::CONFIG;
use crate::message::MessageError;

const SEPARATOR: char = ':';

/// Joins ids in an envelope's publisher chain, so it may never appear inside one.
pub(crate) const CHAIN_SEPARATOR: char = ',';

/// Stands in for reserved characters when building an id from free-form parts.
const REPLACEMENT: char = '_';

/// Conventional suffixes stripped from agent type names, longest first.
const TYPE_SUFFIXES: [&str; 2] = ["GAgent", "Agent"];

/// The unique address of an agent within a runtime, shaped `ShortTypeName:RawId`.
///
/// An `AgentId` is assigned when the agent is created and never changes afterwards.
/// It is used as the key for every store, stream, and registry in the system, and
/// as the entry appended to an envelope's publisher chain.
///
/// ```rust,ignore
/// let id = AgentId::for_type::<CounterAgent>(Some("abc"));
/// assert_eq!(id.as_str(), "Counter:abc");
/// ```
///
/// Neither segment may contain `,`, and the raw segment may not contain `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    /// Builds an id from an already-short type name and a raw id.
    ///
    /// Reserved characters in either part are replaced with `_`, so
    /// `AgentId::new("Node", "x,y")` yields `Node:x_y`.
    pub fn new(short_type_name: &str, raw_id: &str) -> Self {
        let short = sanitize(short_type_name, &[SEPARATOR, CHAIN_SEPARATOR]);
        let raw = sanitize(raw_id, &[SEPARATOR, CHAIN_SEPARATOR]);
        Self(format!("{short}{SEPARATOR}{raw}"))
    }

    /// Builds an id for agent type `A`, stripping the conventional type suffix.
    ///
    /// When `raw_id` is `None` a random alphanumeric token is generated.
    pub fn for_type<A: ?Sized>(raw_id: Option<&str>) -> Self {
        let short = short_type_name(std::any::type_name::<A>());
        match raw_id {
            Some(raw) => Self::new(short, raw),
            None => Self::new(short, &random_raw_id()),
        }
    }

    /// Parses a `ShortTypeName:RawId` string.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidAgentId`] when the separator is missing,
    /// either side of it is empty, the raw side holds another `:`, or a `,` appears
    /// anywhere.
    pub fn parse(value: impl Into<String>) -> Result<Self, MessageError> {
        let value = value.into();
        if value.contains(CHAIN_SEPARATOR) {
            return Err(MessageError::InvalidAgentId(value));
        }
        match value.split_once(SEPARATOR) {
            Some((short, raw)) if !short.is_empty() && !raw.is_empty() && !raw.contains(SEPARATOR) => {
                Ok(Self(value))
            }
            _ => Err(MessageError::InvalidAgentId(value)),
        }
    }

    /// The type segment of the id.
    pub fn short_type_name(&self) -> &str {
        self.0
            .split_once(SEPARATOR)
            .map_or(self.0.as_str(), |(short, _)| short)
    }

    /// The caller-supplied or generated raw segment of the id.
    pub fn raw_id(&self) -> &str {
        self.0.split_once(SEPARATOR).map_or("", |(_, raw)| raw)
    }

    /// The full id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reduces a fully qualified Rust type name to its short agent type name.
///
/// Generic arguments and module paths are dropped, then a trailing `GAgent` or
/// `Agent` suffix is removed unless that would leave nothing behind.
///
/// ```rust,ignore
/// assert_eq!(short_type_name("my_app::agents::CounterAgent"), "Counter");
/// assert_eq!(short_type_name("Agent"), "Agent");
/// ```
pub fn short_type_name(type_name: &str) -> &str {
    let without_generics = type_name.split('<').next().unwrap_or(type_name);
    let last_segment = without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics);
    TYPE_SUFFIXES
        .iter()
        .find_map(|suffix| {
            last_segment
                .strip_suffix(suffix)
                .filter(|stripped| !stripped.is_empty())
        })
        .unwrap_or(last_segment)
}

fn sanitize(part: &str, reserved: &[char]) -> String {
    part.chars()
        .map(|c| if reserved.contains(&c) { REPLACEMENT } else { c })
        .collect()
}

fn random_raw_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CONFIG.defaults.raw_id_length)
        .map(char::from)
        .collect()
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AgentId {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AgentId {
    type Error = MessageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> Self {
        id.0
    }
}
