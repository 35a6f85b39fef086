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
use crate::setup::events::{Deposit, Deposited};

#[agent_state]
pub struct LedgerState {
    pub balance: i64,
    pub deposits: u32,
}

impl AgentState for LedgerState {
    fn transition_state(self, event: &StateEvent) -> Self {
        match event.unpack::<Deposited>() {
            Ok(deposited) => Self {
                balance: self.balance + deposited.amount,
                deposits: self.deposits + 1,
            },
            Err(_) => self,
        }
    }
}

/// An event-sourced agent: every deposit is raised as `Deposited` and confirmed
/// before the handler returns. A stale confirm catches up with the log and retries once.
#[derive(Debug, Default)]
pub struct Ledger {
    pub probe: Probe,
}

#[async_trait]
impl Agent for Ledger {
    type State = LedgerState;

    fn description(&self) -> String {
        "event-sourced balance".to_string()
    }

    fn register_handlers(handlers: &mut HandlerRegistry<Self>) {
        handlers.on::<Deposit>(|agent, ctx| {
            async move {
                agent.raise_event(&Deposited {
                    amount: ctx.event.amount,
                })?;
                let version = match agent.confirm_events().await {
                    Ok(version) => version,
                    Err(err) if err.is_version_conflict() => {
                        let caught_up = agent.refresh_events().await?;
                        agent.model.probe.record(format!("refreshed:v{caught_up}"));
                        agent.confirm_events().await?
                    }
                    Err(err) => return Err(err.into()),
                };
                agent
                    .model
                    .probe
                    .record(format!("v{version}:balance={}", agent.state.balance));
                Ok::<(), anyhow::Error>(())
            }
            .boxed()
        });
    }

    async fn on_activate(&mut self, state: &LedgerState) -> anyhow::Result<()> {
        self.probe.record(format!("activated:{}", state.balance));
        Ok(())
    }
}
