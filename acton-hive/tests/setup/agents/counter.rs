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
use acton_hive::prelude::*;
use futures::FutureExt;

use crate::setup::agents::Probe;
use crate::setup::events::{Increment, Reset};

#[agent_state]
pub struct CounterState {
    pub count: i64,
}

impl AgentState for CounterState {}

/// A plain (not event-sourced) agent that keeps a running total.
///
/// Every handled increment records `count=<n>` in the probe; activation records
/// `activated:<n>` with the restored count.
#[derive(Debug, Default)]
pub struct Counter {
    pub probe: Probe,
    pub step_limit: Option<i64>,
}

impl Counter {
    pub fn new(probe: Probe) -> Self {
        Self {
            probe,
            step_limit: None,
        }
    }
}

#[async_trait]
impl Agent for Counter {
    type State = CounterState;

    fn description(&self) -> String {
        "counts increments".to_string()
    }

    fn register_handlers(handlers: &mut HandlerRegistry<Self>) {
        handlers
            .on::<Increment>(|agent, ctx| {
                async move {
                    if let Some(limit) = agent.model.step_limit {
                        anyhow::ensure!(ctx.event.amount <= limit, "step {} over limit", ctx.event.amount);
                    }
                    agent.state.count += ctx.event.amount;
                    agent.model.probe.record(format!("count={}", agent.state.count));
                    Ok(())
                }
                .boxed()
            })
            .on::<Reset>(|agent, _ctx| {
                async move {
                    agent.state.count = 0;
                    agent.model.probe.record("reset");
                    Ok(())
                }
                .boxed()
            });
    }

    async fn configure(&mut self, config: serde_json::Value) -> anyhow::Result<()> {
        let limit = config
            .get("step_limit")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| anyhow::anyhow!("missing step_limit"))?;
        self.step_limit = Some(limit);
        Ok(())
    }

    async fn on_activate(&mut self, state: &CounterState) -> anyhow::Result<()> {
        self.probe.record(format!("activated:{}", state.count));
        Ok(())
    }
}
