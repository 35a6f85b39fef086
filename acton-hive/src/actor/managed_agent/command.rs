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

use tokio::sync::oneshot;

use crate::common::Reply;
use crate::message::{AgentId, EventEnvelope};
use crate::traits::EventModule;

/// Requests an [`ActorHandle`](crate::common::ActorHandle) sends into an agent's inbox.
pub(crate) enum ActorCommand {
    Activate(Reply<()>),
    Deactivate(Reply<()>),
    HandleEvent {
        envelope: EventEnvelope,
        reply: Option<Reply<()>>,
    },
    Configure {
        config: serde_json::Value,
        reply: Reply<()>,
    },
    ParentId(Reply<Option<AgentId>>),
    ChildrenIds(Reply<Vec<AgentId>>),
    Description(oneshot::Sender<String>),
    TypeName(oneshot::Sender<String>),
    CurrentVersion(oneshot::Sender<Option<u64>>),
    SetParent {
        parent: Option<AgentId>,
        reply: Reply<()>,
    },
    AddChild {
        child: AgentId,
        reply: Reply<()>,
    },
    RemoveChild {
        child: AgentId,
        reply: Reply<()>,
    },
    RegisterModule {
        module: Arc<dyn EventModule>,
        reply: Reply<()>,
    },
    Terminate(Reply<()>),
}

impl ActorCommand {
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::Activate(_) => "Activate",
            Self::Deactivate(_) => "Deactivate",
            Self::HandleEvent { .. } => "HandleEvent",
            Self::Configure { .. } => "Configure",
            Self::ParentId(_) => "ParentId",
            Self::ChildrenIds(_) => "ChildrenIds",
            Self::Description(_) => "Description",
            Self::TypeName(_) => "TypeName",
            Self::CurrentVersion(_) => "CurrentVersion",
            Self::SetParent { .. } => "SetParent",
            Self::AddChild { .. } => "AddChild",
            Self::RemoveChild { .. } => "RemoveChild",
            Self::RegisterModule { .. } => "RegisterModule",
            Self::Terminate(_) => "Terminate",
        }
    }
}
