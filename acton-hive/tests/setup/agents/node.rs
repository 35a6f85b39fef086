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
use crate::setup::events::{Ping, Pong};

#[agent_state]
pub struct NodeState {
    pub pings: u32,
}

impl AgentState for NodeState {}

/// A hierarchy member that records every envelope it handles as
/// `<raw id>:<event type>`.
///
/// When `reply_up` is set, each ping it receives from someone else is answered
/// with a `Pong` published upwards.
#[derive(Debug, Default)]
pub struct Node {
    pub probe: Probe,
    pub reply_up: bool,
}

impl Node {
    pub fn new(probe: Probe) -> Self {
        Self {
            probe,
            reply_up: false,
        }
    }

    pub fn replying(probe: Probe) -> Self {
        Self {
            probe,
            reply_up: true,
        }
    }
}

#[async_trait]
impl Agent for Node {
    type State = NodeState;

    fn description(&self) -> String {
        "hierarchy node".to_string()
    }

    fn register_handlers(handlers: &mut HandlerRegistry<Self>) {
        handlers
            .on::<Ping>(|agent, ctx| {
                async move {
                    agent.state.pings += 1;
                    if agent.model.reply_up {
                        agent.publish_event(
                            &Pong {
                                label: ctx.event.label.clone(),
                            },
                            EventDirection::Up,
                        )?;
                    }
                    Ok::<(), anyhow::Error>(())
                }
                .boxed()
            })
            .on_all(|agent, envelope| {
                async move {
                    let entry = format!(
                        "{}:{}",
                        agent.id().raw_id(),
                        envelope.payload().type_identifier()
                    );
                    agent.model.probe.record(entry);
                    Ok(())
                }
                .boxed()
            });
    }
}
