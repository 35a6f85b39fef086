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

use async_trait::async_trait;

/// At-most-once processing guard keyed by `(scope, event_id)`.
#[async_trait]
pub trait EventDeduplicator: Debug + Send + Sync {
    /// Returns `true` the first time a pair is seen, `false` for every repeat.
    ///
    /// Check and mark are one atomic step, so concurrent callers with the same pair
    /// see exactly one `true`.
    async fn try_mark_processed(&self, scope: &str, event_id: &str) -> bool;

    /// Forgets every id recorded under `scope`, so each one counts as new again.
    async fn forget_scope(&self, scope: &str);
}
