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

use std::path::Path;
use std::time::Duration;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Configuration for the Acton Hive runtime.
///
/// Loaded from `config.toml` in the XDG config directory for the `acton-hive`
/// prefix. Every section and field is optional; anything missing takes its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveConfig {
    /// Channel and cache capacities.
    pub limits: LimitsConfig,
    /// Shutdown timeouts.
    pub timeouts: TimeoutConfig,
    /// Snapshot policy defaults.
    pub snapshots: SnapshotConfig,
    /// Default values used when the caller supplies none.
    pub defaults: DefaultsConfig,
    /// Behavioral switches.
    pub behavior: BehaviorConfig,
    /// How envelopes travel between actors.
    pub transport: TransportConfig,
}

/// Limits and capacity configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// MPSC channel size for an agent's command inbox
    pub agent_inbox_capacity: usize,
    /// Broadcast buffer size of each actor stream
    pub stream_capacity: usize,
    /// Queue size of the broker transport
    pub transport_queue_capacity: usize,
    /// Event ids remembered per deduplication scope
    pub dedup_entries_per_scope: usize,
}

/// Timeout-related configuration values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed for a single agent to stop, in milliseconds
    pub agent_shutdown_timeout_ms: u64,
    /// Time allowed for the whole runtime to stop, in milliseconds
    pub system_shutdown_timeout_ms: u64,
}

/// Snapshot policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Versions between snapshots for the interval strategy
    pub interval: u64,
}

/// Default configuration values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Length of generated raw agent ids
    pub raw_id_length: usize,
}

/// Behavioral configuration switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Drop inbound envelopes whose id was already processed by the actor
    pub deduplicate_events: bool,
    /// Save plain agent state after every turn that matched a handler
    pub persist_state_after_turn: bool,
}

/// Transport selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Which transport forwards envelopes between actors
    pub kind: TransportKind,
}

/// The available actor transports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Produce onto the target actor's stream.
    #[default]
    Stream,
    /// Encode a transport message and hand it to the broker queue.
    Broker,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            agent_inbox_capacity: 255,
            stream_capacity: 1024,
            transport_queue_capacity: 1024,
            dedup_entries_per_scope: 10_000,
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            agent_shutdown_timeout_ms: 10_000,
            system_shutdown_timeout_ms: 30_000,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { interval: 100 }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { raw_id_length: 12 }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            deduplicate_events: true,
            persist_state_after_turn: true,
        }
    }
}

impl HiveConfig {
    /// Agent shutdown timeout as a `Duration`.
    pub const fn agent_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.agent_shutdown_timeout_ms)
    }

    /// System shutdown timeout as a `Duration`.
    pub const fn system_shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.system_shutdown_timeout_ms)
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `source` is not a valid configuration.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Loads the configuration from XDG-compliant locations.
    ///
    /// Looks for `acton-hive/config.toml` under `$XDG_CONFIG_HOME` and then the
    /// `$XDG_CONFIG_DIRS`. A missing file yields the defaults. A malformed file is
    /// logged and also yields the defaults.
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("acton-hive") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        match xdg_dirs.find_config_file("config.toml") {
            Some(path) => Self::load_from_path(&path),
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        }
    }

    /// Loads the configuration from an explicit file, falling back to the defaults
    /// when it cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Self {
        info!("Loading configuration from: {}", path.display());
        match std::fs::read_to_string(path) {
            Ok(config_str) => match Self::from_toml_str(&config_str) {
                Ok(config) => {
                    info!("Successfully loaded configuration");
                    config
                }
                Err(e) => {
                    error!("Failed to parse configuration file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                error!("Failed to read configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

lazy_static! {
    /// Process-wide configuration loaded from XDG-compliant locations
    pub static ref CONFIG: HiveConfig = HiveConfig::load();
}
