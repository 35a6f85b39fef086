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
#![allow(dead_code)]

use std::time::Duration;

use acton_hive::config::TransportKind;
use acton_hive::prelude::*;
use tokio::time::timeout;

use crate::setup::agents::counter::{Counter, CounterState};
use crate::setup::agents::node::Node;
use crate::setup::agents::Probe;
use crate::setup::events::{Increment, Ping, Pong};
use crate::setup::{eventually, initialize_tracing, test_config};

mod setup;

fn increment(amount: i64) -> EventEnvelope {
    EventEnvelope::from_event(&Increment { amount }, EventDirection::SelfOnly).unwrap()
}

fn node_id(raw: &str) -> AgentId {
    AgentId::new("Node", raw)
}

async fn spawn_node(
    runtime: &AgentRuntime,
    node: Node,
    raw: &str,
    parent: Option<&str>,
) -> anyhow::Result<ActorHandle> {
    let mut config = AgentConfig::new().with_raw_id(raw);
    if let Some(parent) = parent {
        config = config.with_parent(node_id(parent));
    }
    Ok(runtime.spawn_agent_with_config(node, config).await?)
}

/// Ids are `<agent type>:<raw id>` and may only be hosted once.
#[tokio::test]
async fn test_spawn_registers_agent() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let counter = runtime
        .spawn_agent_with_config(Counter::default(), AgentConfig::new().with_raw_id("abc"))
        .await?;
    assert_eq!(counter.id().as_str(), "Counter:abc");
    assert_eq!(runtime.agent_count(), 1);
    assert_eq!(runtime.get(counter.id()), Some(counter.clone()));

    let duplicate = runtime
        .spawn_agent_with_config(Counter::default(), AgentConfig::new().with_raw_id("abc"))
        .await
        .unwrap_err();
    assert_eq!(duplicate, ActorError::AlreadyRegistered(counter.id().clone()));

    let generated = runtime.spawn_agent(Counter::default()).await?;
    assert_eq!(generated.id().short_type_name(), "Counter");
    assert_ne!(generated.id(), counter.id());
    assert_eq!(runtime.agent_count(), 2);

    runtime.shutdown_all().await?;
    Ok(())
}

/// Description and type name are served by the hosted agent.
#[tokio::test]
async fn test_describes_agent() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let counter = runtime.spawn_agent(Counter::default()).await?;

    assert_eq!(counter.get_description().await?, "counts increments");
    assert!(counter.get_agent_type_name().await?.ends_with("Counter"));

    runtime.shutdown_all().await?;
    Ok(())
}

/// Agents activate on their first request, not when spawned.
#[tokio::test]
async fn test_activation_is_lazy() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let probe = Probe::default();
    let counter = runtime.spawn_agent(Counter::new(probe.clone())).await?;
    assert!(probe.entries().is_empty());

    counter.handle_event(increment(3)).await?;
    counter.activate().await?;
    assert_eq!(probe.entries(), vec!["activated:0", "count=3"]);

    runtime.shutdown_all().await?;
    Ok(())
}

/// Plain state is saved after each handled turn and restored on respawn.
#[tokio::test]
async fn test_plain_state_persists() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let config = || AgentConfig::new().with_raw_id("persist");
    let counter = runtime
        .spawn_agent_with_config(Counter::default(), config())
        .await?;
    counter.handle_event(increment(3)).await?;

    let saved = runtime
        .stores()
        .state_store
        .load(counter.id())
        .await?
        .expect("state saved after the turn");
    assert_eq!(saved.version, 0);
    assert_eq!(saved.restore::<CounterState>()?.count, 3);

    runtime.destroy_agent(counter.id(), false).await?;
    let probe = Probe::default();
    let counter = runtime
        .spawn_agent_with_config(Counter::new(probe.clone()), config())
        .await?;
    counter.handle_event(increment(1)).await?;
    assert_eq!(probe.entries(), vec!["activated:3", "count=4"]);

    runtime.shutdown_all().await?;
    Ok(())
}

/// Configuration is parsed as JSON and applied by the agent.
#[tokio::test]
async fn test_configure() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let probe = Probe::default();
    let counter = runtime.spawn_agent(Counter::new(probe.clone())).await?;

    counter.configure(r#"{ "step_limit": 5 }"#).await?;
    counter.handle_event(increment(10)).await?;
    counter.handle_event(increment(4)).await?;
    assert_eq!(probe.entries(), vec!["activated:0", "count=4"]);

    let not_json = counter.configure("step_limit = 5").await.unwrap_err();
    assert!(matches!(not_json, ActorError::Configuration { .. }));
    let rejected = counter.configure("{}").await.unwrap_err();
    assert!(matches!(rejected, ActorError::Configuration { .. }));

    runtime.shutdown_all().await?;
    Ok(())
}

/// The same envelope id is only handled once per actor.
#[tokio::test]
async fn test_duplicate_envelopes_are_skipped() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let probe = Probe::default();
    let counter = runtime.spawn_agent(Counter::new(probe.clone())).await?;

    let envelope = increment(2);
    counter.handle_event(envelope.clone()).await?;
    counter.handle_event(envelope).await?;
    assert_eq!(probe.entries(), vec!["activated:0", "count=2"]);

    runtime.shutdown_all().await?;
    Ok(())
}

/// Spawning with a parent links both sides.
#[tokio::test]
async fn test_spawn_with_parent_links() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let root = spawn_node(&runtime, Node::default(), "root", None).await?;
    let leaf = spawn_node(&runtime, Node::default(), "leaf", Some("root")).await?;

    assert_eq!(leaf.get_parent_id().await?, Some(node_id("root")));
    assert_eq!(root.get_children_ids().await?, vec![node_id("leaf")]);
    assert_eq!(root.get_parent_id().await?, None);

    let record = runtime
        .stores()
        .hierarchy_store
        .load(&node_id("root"))
        .await?
        .expect("hierarchy persisted");
    assert!(record.children_ids.contains(&node_id("leaf")));

    runtime.shutdown_all().await?;
    Ok(())
}

/// Linking an actor under itself or under one of its descendants is refused.
#[tokio::test]
async fn test_link_refuses_cycles() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    spawn_node(&runtime, Node::default(), "a", None).await?;
    spawn_node(&runtime, Node::default(), "b", Some("a")).await?;
    spawn_node(&runtime, Node::default(), "c", Some("b")).await?;

    let err = runtime.link(&node_id("c"), &node_id("a")).await.unwrap_err();
    assert_eq!(
        err,
        ActorError::HierarchyCycle {
            parent: node_id("c"),
            child: node_id("a"),
        }
    );
    assert!(matches!(
        runtime.link(&node_id("a"), &node_id("a")).await,
        Err(ActorError::HierarchyCycle { .. })
    ));
    assert!(matches!(
        runtime.link(&node_id("a"), &node_id("missing")).await,
        Err(ActorError::NotFound(_))
    ));

    runtime.shutdown_all().await?;
    Ok(())
}

/// Linking to a new parent detaches the child from the old one; unlinking
/// clears both sides.
#[tokio::test]
async fn test_relink_and_unlink() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let first = spawn_node(&runtime, Node::default(), "first", None).await?;
    let second = spawn_node(&runtime, Node::default(), "second", None).await?;
    let child = spawn_node(&runtime, Node::default(), "child", Some("first")).await?;

    runtime.link(&node_id("second"), &node_id("child")).await?;
    assert!(first.get_children_ids().await?.is_empty());
    assert_eq!(second.get_children_ids().await?, vec![node_id("child")]);
    assert_eq!(child.get_parent_id().await?, Some(node_id("second")));

    runtime.unlink(&node_id("second"), &node_id("child")).await?;
    assert!(second.get_children_ids().await?.is_empty());
    assert_eq!(child.get_parent_id().await?, None);

    runtime.shutdown_all().await?;
    Ok(())
}

/// Destroying an actor removes it from its relatives and forgets its links.
#[tokio::test]
async fn test_destroy_detaches_relatives() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let root = spawn_node(&runtime, Node::default(), "root", None).await?;
    let middle = spawn_node(&runtime, Node::default(), "middle", Some("root")).await?;
    let leaf = spawn_node(&runtime, Node::default(), "leaf", Some("middle")).await?;

    runtime.destroy_agent(&node_id("middle"), false).await?;

    assert!(!middle.is_running());
    assert!(root.get_children_ids().await?.is_empty());
    assert_eq!(leaf.get_parent_id().await?, None);
    assert!(runtime
        .stores()
        .hierarchy_store
        .load(&node_id("middle"))
        .await?
        .is_none());
    assert!(matches!(
        runtime.destroy_agent(&node_id("middle"), false).await,
        Err(ActorError::NotFound(_))
    ));

    runtime.shutdown_all().await?;
    Ok(())
}

/// A downward publication reaches the child through its stream, carrying the
/// parent in its publisher chain.
#[tokio::test]
async fn test_publish_down_reaches_child() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let probe = Probe::default();
    let root = spawn_node(&runtime, Node::new(probe.clone()), "root", None).await?;
    spawn_node(&runtime, Node::new(probe.clone()), "leaf", Some("root")).await?;
    let mut leaf_stream = runtime.subscribe(&node_id("leaf"));

    let id = root
        .publish(
            &Ping {
                label: "down".to_string(),
            },
            EventDirection::Down,
        )
        .await?;

    let delivered = timeout(Duration::from_secs(5), leaf_stream.recv())
        .await?
        .expect("leaf stream open");
    assert_eq!(delivered.id(), id);
    assert_eq!(delivered.publisher_chain(), Some("Node:root"));
    assert_eq!(delivered.publisher_id(), Some(&node_id("root")));

    eventually(|| probe.count("leaf:Ping") == 1).await;
    assert_eq!(probe.count("root:Ping"), 1);

    runtime.shutdown_all().await?;
    Ok(())
}

/// A child's upward reply reaches the parent once, keeps the correlation id of
/// the envelope that caused it, and nothing bounces back down.
#[tokio::test]
async fn test_reply_up_keeps_correlation() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let probe = Probe::default();
    let root = spawn_node(&runtime, Node::new(probe.clone()), "root", None).await?;
    spawn_node(&runtime, Node::replying(probe.clone()), "leaf", Some("root")).await?;
    let mut root_stream = runtime.subscribe(&node_id("root"));

    let ping = EventEnvelope::from_event(
        &Ping {
            label: "marco".to_string(),
        },
        EventDirection::Down,
    )?
    .with_publisher(node_id("root"))
    .with_correlation_id("conversation-1");
    root.handle_event(ping).await?;

    let reply = timeout(Duration::from_secs(5), root_stream.recv())
        .await?
        .expect("root stream open");
    assert!(reply.payload().is::<Pong>());
    assert_eq!(reply.payload().unpack::<Pong>()?.label, "marco");
    assert_eq!(reply.correlation_id(), Some("conversation-1"));
    assert_eq!(reply.publisher_id(), Some(&node_id("leaf")));

    eventually(|| probe.count("root:Pong") == 1).await;
    assert_eq!(probe.count("leaf:Pong"), 1);
    assert_eq!(probe.count("leaf:Ping"), 1);
    assert_eq!(probe.count("root:Ping"), 1);

    runtime.shutdown_all().await?;
    Ok(())
}

/// The broker transport delivers the same way, with observers still seeing the
/// envelope on the target's stream.
#[tokio::test]
async fn test_broker_transport_delivers() -> anyhow::Result<()> {
    initialize_tracing();
    let mut config = test_config();
    config.transport.kind = TransportKind::Broker;
    let runtime = HiveApp::launch_with_config(config).await;
    let probe = Probe::default();
    let root = spawn_node(&runtime, Node::new(probe.clone()), "root", None).await?;
    spawn_node(&runtime, Node::new(probe.clone()), "leaf", Some("root")).await?;
    let mut leaf_stream = runtime.subscribe(&node_id("leaf"));

    root.publish(
        &Ping {
            label: "broker".to_string(),
        },
        EventDirection::Down,
    )
    .await?;

    let observed = timeout(Duration::from_secs(5), leaf_stream.recv())
        .await?
        .expect("leaf stream open");
    assert_eq!(observed.publisher_chain(), Some("Node:root"));
    eventually(|| probe.count("leaf:Ping") == 1).await;

    runtime.shutdown_all().await?;
    Ok(())
}

/// Shutting down stops every actor and empties the registry.
#[tokio::test]
async fn test_shutdown_stops_everything() -> anyhow::Result<()> {
    initialize_tracing();
    let runtime = HiveApp::launch_with_config(test_config()).await;
    let probe = Probe::default();
    let counter = runtime.spawn_agent(Counter::new(probe.clone())).await?;
    counter.handle_event(increment(1)).await?;
    spawn_node(&runtime, Node::default(), "root", None).await?;

    runtime.shutdown_all().await?;

    assert_eq!(runtime.agent_count(), 0);
    assert!(!counter.is_running());
    assert!(matches!(
        counter.enqueue(increment(1)).await,
        Err(ActorError::MailboxClosed(_))
    ));
    Ok(())
}
