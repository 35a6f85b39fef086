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

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use acton_hive::prelude::*;

use crate::setup::events::Ping;
use crate::setup::initialize_tracing;

mod setup;

fn node(raw: &str) -> AgentId {
    AgentId::new("Node", raw)
}

fn router(raw: &str, parent: Option<&str>, children: &[&str]) -> EventRouter {
    let mut router = EventRouter::new(node(raw));
    router.set_parent(parent.map(node));
    for child in children {
        router.add_child(node(child));
    }
    router
}

fn ping(direction: EventDirection, publisher: &str) -> EventEnvelope {
    EventEnvelope::from_event(
        &Ping {
            label: "hello".to_string(),
        },
        direction,
    )
    .expect("encode ping")
    .with_publisher(node(publisher))
}

/// Delivers `envelope` to `start` and keeps routing every forwarded copy until
/// the network is quiet. Returns each local delivery in order.
async fn propagate(
    routers: &HashMap<AgentId, EventRouter>,
    start: AgentId,
    envelope: EventEnvelope,
) -> Vec<(AgentId, EventEnvelope)> {
    let mut handled = Vec::new();
    let mut queue = VecDeque::from([(start, envelope)]);
    while let Some((at, mut envelope)) = queue.pop_front() {
        let outgoing = Mutex::new(Vec::new());
        let router = &routers[&at];
        let _ = router
            .route(
                &mut envelope,
                |local| {
                    handled.push((at.clone(), local));
                    async {}
                },
                |target, copy| {
                    outgoing.lock().unwrap().push((target, copy));
                    async { Ok(()) }
                },
            )
            .await;
        queue.extend(outgoing.into_inner().unwrap());
    }
    handled
}

fn network(routers: Vec<EventRouter>) -> HashMap<AgentId, EventRouter> {
    routers
        .into_iter()
        .map(|router| (router.actor_id().clone(), router))
        .collect()
}

fn chain() -> HashMap<AgentId, EventRouter> {
    network(vec![
        router("a", None, &["b"]),
        router("b", Some("a"), &["c"]),
        router("c", Some("b"), &[]),
    ])
}

fn visited(handled: &[(AgentId, EventEnvelope)]) -> Vec<&str> {
    handled.iter().map(|(id, _)| id.raw_id()).collect()
}

/// Routing the same envelope through the same actor twice handles it once.
#[tokio::test]
async fn test_route_twice_handles_once() {
    initialize_tracing();
    let router = router("a", None, &[]);
    let mut envelope = ping(EventDirection::SelfOnly, "a");
    let mut handled = 0;

    let first = router
        .route(&mut envelope, |_| {
            handled += 1;
            async {}
        }, |_, _| async { Ok(()) })
        .await;
    assert!(matches!(first, RouteOutcome::Routed(_)));

    let second = router
        .route(&mut envelope, |_| {
            handled += 1;
            async {}
        }, |_, _| async { Ok(()) })
        .await;
    assert_eq!(second, RouteOutcome::AlreadyPublished);
    assert_eq!(handled, 1);
    assert_eq!(envelope.publisher_chain(), Some("Node:a"));
}

/// A downward envelope from the root reaches every descendant exactly once, and
/// each delivery carries the chain of actors that handled it so far.
#[tokio::test]
async fn test_down_reaches_each_descendant_once() {
    initialize_tracing();
    let handled = propagate(&chain(), node("a"), ping(EventDirection::Down, "a")).await;

    assert_eq!(visited(&handled), vec!["a", "b", "c"]);
    let (_, at_c) = &handled[2];
    assert_eq!(at_c.publisher_chain(), Some("Node:a,Node:b,Node:c"));
    assert_eq!(
        at_c.publishers(),
        vec![node("a"), node("b"), node("c")]
    );
}

/// An upward envelope climbs to the root without revisiting anyone.
#[tokio::test]
async fn test_up_climbs_to_root() {
    initialize_tracing();
    let handled = propagate(&chain(), node("c"), ping(EventDirection::Up, "c")).await;
    assert_eq!(visited(&handled), vec!["c", "b", "a"]);
}

/// `Both` from the middle reaches parent and child, and the parent does not send
/// it back down to the actor it came from.
#[tokio::test]
async fn test_both_from_middle_visits_every_actor_once() {
    initialize_tracing();
    let handled = propagate(&chain(), node("b"), ping(EventDirection::Both, "b")).await;

    let mut actors = visited(&handled);
    actors.sort_unstable();
    assert_eq!(actors, vec!["a", "b", "c"]);
}

/// `SelfOnly` is handled locally and never forwarded.
#[tokio::test]
async fn test_self_only_stays_local() {
    initialize_tracing();
    let handled = propagate(&chain(), node("b"), ping(EventDirection::SelfOnly, "b")).await;
    assert_eq!(visited(&handled), vec!["b"]);
}

/// A mislinked hierarchy where two actors list each other as children still
/// terminates, with each actor handling the envelope once.
#[tokio::test]
async fn test_cyclic_links_terminate() {
    initialize_tracing();
    let routers = network(vec![
        router("a", None, &["b"]),
        router("b", None, &["c"]),
        router("c", None, &["a"]),
    ]);
    let handled = propagate(&routers, node("a"), ping(EventDirection::Down, "a")).await;
    assert_eq!(visited(&handled), vec!["a", "b", "c"]);
}

/// The first forwarded hop carries the publishing actor in its chain.
#[tokio::test]
async fn test_forwarded_copy_carries_chain() {
    initialize_tracing();
    let abc = AgentId::new("Counter", "abc");
    let def = AgentId::new("Counter", "def");
    let mut router = EventRouter::new(abc.clone());
    router.add_child(def.clone());

    let mut envelope = EventEnvelope::from_event(
        &Ping {
            label: "x".to_string(),
        },
        EventDirection::Down,
    )
    .unwrap()
    .with_publisher(abc.clone());
    let sent = Mutex::new(Vec::new());
    let outcome = router
        .route(&mut envelope, |_| async {}, |target, copy| {
            sent.lock().unwrap().push((target, copy));
            async { Ok(()) }
        })
        .await;

    let RouteOutcome::Routed(report) = outcome else {
        panic!("envelope should have been routed");
    };
    assert_eq!(report.delivered, vec![def.clone()]);
    let sent = sent.into_inner().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, def);
    assert_eq!(sent[0].1.publisher_chain(), Some("Counter:abc"));
    assert_eq!(sent[0].1.id(), envelope.id());
}

/// One failing child is reported without keeping the others from receiving
/// their copies.
#[tokio::test]
async fn test_forward_failure_is_isolated() {
    initialize_tracing();
    let router = router("p", None, &["b", "c", "d"]);
    let mut envelope = ping(EventDirection::Down, "p");
    assert!(router.enter(&mut envelope));

    let report = router
        .forward(&envelope, |target, _copy| async move {
            if target.raw_id() == "c" {
                Err(TransportError::TargetNotFound(target))
            } else {
                Ok(())
            }
        })
        .await;

    assert!(!report.is_complete());
    assert_eq!(report.delivered, vec![node("b"), node("d")]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].target, node("c"));
    assert_eq!(report.failures[0].envelope_id, envelope.id());
    assert_eq!(
        report.failures[0].error,
        TransportError::TargetNotFound(node("c"))
    );
}

/// Children that already handled the envelope are not forwarded to.
#[tokio::test]
async fn test_targets_skip_publishers() {
    initialize_tracing();
    let router = router("b", Some("a"), &["c", "d"]);
    let mut envelope = ping(EventDirection::Both, "a");
    assert!(EventRouter::new(node("a")).enter(&mut envelope));
    assert!(EventRouter::new(node("d")).enter(&mut envelope));
    assert!(!envelope.insert_metadata(PUBLISHERS_METADATA_KEY, ""));

    assert_eq!(router.targets(&envelope), vec![node("c")]);
}
