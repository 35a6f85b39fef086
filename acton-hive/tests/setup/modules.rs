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

use crate::setup::agents::Probe;
use crate::setup::events::{Ping, Pong};

/// Records `<name>` for every envelope it handles and optionally fails afterwards.
#[derive(Debug, Clone)]
pub struct RecordingModule {
    pub name: String,
    pub priority: i32,
    pub probe: Probe,
    pub fail: bool,
}

impl RecordingModule {
    pub fn new(name: &str, priority: i32, probe: Probe) -> Self {
        Self {
            name: name.to_string(),
            priority,
            probe,
            fail: false,
        }
    }

    pub fn failing(name: &str, priority: i32, probe: Probe) -> Self {
        Self {
            fail: true,
            ..Self::new(name, priority, probe)
        }
    }
}

#[async_trait]
impl EventModule for RecordingModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn can_handle(&self, _envelope: &EventEnvelope) -> bool {
        true
    }

    async fn handle(&self, _envelope: &EventEnvelope, _ctx: &mut ModuleContext) -> anyhow::Result<()> {
        self.probe.record(self.name.clone());
        if self.fail {
            anyhow::bail!("{} refused the envelope", self.name);
        }
        Ok(())
    }
}

/// Answers every `Ping` with a self-addressed `Pong` carrying the same label.
#[derive(Debug, Default)]
pub struct EchoModule;

#[async_trait]
impl EventModule for EchoModule {
    fn name(&self) -> &str {
        "echo"
    }

    fn priority(&self) -> i32 {
        -100
    }

    fn can_handle(&self, envelope: &EventEnvelope) -> bool {
        envelope.payload().is::<Ping>()
    }

    async fn handle(&self, envelope: &EventEnvelope, ctx: &mut ModuleContext) -> anyhow::Result<()> {
        let ping: Ping = envelope.payload().unpack()?;
        ctx.publish_event(&Pong { label: ping.label }, EventDirection::SelfOnly)?;
        Ok(())
    }
}
