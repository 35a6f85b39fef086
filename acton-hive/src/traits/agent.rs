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
use std::sync::Arc;

use async_trait::async_trait;

use crate::actor::HandlerRegistry;
use crate::traits::{AgentState, EventModule};

/// A logical unit of identity, state, and behavior.
///
/// The agent value itself is the model owned by its [`ManagedAgent`](crate::actor::ManagedAgent);
/// its persistable data lives in [`Agent::State`]. Handlers are declared once per
/// agent type through [`Agent::register_handlers`] instead of being discovered at
/// run time.
#[async_trait]
pub trait Agent: Debug + Send + Sync + Sized + 'static {
    /// The persisted state type.
    type State: AgentState;

    /// A human readable description, served by `GetDescription`.
    fn description(&self) -> String;

    /// Fills the static handler table for this agent type.
    fn register_handlers(handlers: &mut HandlerRegistry<Self>);

    /// Dynamic modules merged into the pipeline on every activation.
    fn modules(&self) -> Vec<Arc<dyn EventModule>> {
        Vec::new()
    }

    /// Applies a JSON configuration document.
    async fn configure(&mut self, config: serde_json::Value) -> anyhow::Result<()> {
        let _ = config;
        Ok(())
    }

    /// Runs after state has been restored and the pipeline built.
    async fn on_activate(&mut self, state: &Self::State) -> anyhow::Result<()> {
        let _ = state;
        Ok(())
    }

    /// Runs before state and hierarchy are persisted on deactivation.
    async fn on_deactivate(&mut self, state: &Self::State) -> anyhow::Result<()> {
        let _ = state;
        Ok(())
    }
}
