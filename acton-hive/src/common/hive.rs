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

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::trace;

use crate::common::config::{HiveConfig, TransportKind};
use crate::common::hive_inner::HiveInner;
use crate::common::{AgentRuntime, BrokerTransport, HiveStores, RunManager, StreamTransport};
use crate::traits::ActorTransport;

/// Entry point for starting a hive.
///
/// Use one of the launch methods; there is nothing to configure on the value itself.
#[derive(Default, Debug, Clone)]
pub struct HiveApp;

impl HiveApp {
    /// Starts a hive with configuration loaded from the XDG config directory and
    /// in-memory stores.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use acton_hive::prelude::*;
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let runtime = HiveApp::launch_async().await;
    ///     // Spawn agents...
    ///     runtime.shutdown_all().await.unwrap();
    /// }
    /// ```
    pub async fn launch_async() -> AgentRuntime {
        let config = HiveConfig::load();
        trace!("Configuration loaded: {:?}", config);
        Self::launch_with_config(config).await
    }

    /// Starts a hive with `config` and in-memory stores.
    pub async fn launch_with_config(config: HiveConfig) -> AgentRuntime {
        let stores = HiveStores::in_memory(&config);
        Self::launch_with(stores, config).await
    }

    /// Starts a hive on the given stores.
    ///
    /// Must be called from within a Tokio runtime; the broker transport spawns its
    /// consumer here.
    pub async fn launch_with(stores: HiveStores, config: HiveConfig) -> AgentRuntime {
        trace!("Starting hive");
        let registry = Arc::new(DashMap::new());
        let tracker = TaskTracker::new();
        let cancellation_token = CancellationToken::new();

        let transport: Arc<dyn ActorTransport> = match config.transport.kind {
            TransportKind::Stream => Arc::new(StreamTransport::new(Arc::clone(&stores.streams))),
            TransportKind::Broker => Arc::new(BrokerTransport::start(
                Arc::clone(&registry),
                Arc::clone(&stores.streams),
                config.limits.transport_queue_capacity,
                &tracker,
                cancellation_token.child_token(),
            )),
        };

        let runtime = AgentRuntime(Arc::new(HiveInner {
            registry,
            stores,
            transport,
            run_manager: Arc::new(RunManager::new()),
            tracker,
            cancellation_token,
            config,
        }));
        trace!(transport = ?runtime.config().transport.kind, "Hive started");
        runtime
    }
}
