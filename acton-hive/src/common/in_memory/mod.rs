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

//! Process-local implementations of the store, stream, and deduplication contracts.
//!
//! Each adapter is a keyed [`DashMap`](dashmap::DashMap), so different agent ids never
//! contend. They suit tests and single-process deployments; production code should
//! depend on the traits in [`crate::traits`] only.

pub use deduplicator::InMemoryDeduplicator;
pub use event_store::InMemoryEventStore;
pub use hierarchy_store::InMemoryHierarchyStore;
pub use state_store::InMemoryStateStore;
pub use stream::{InMemoryStream, InMemoryStreamProvider};

mod deduplicator;
mod event_store;
mod hierarchy_store;
mod state_store;
mod stream;
