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

use crate::common::config::CONFIG;
use crate::traits::SnapshotStrategy;

/// Snapshots every `interval` versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalSnapshotStrategy {
    interval: u64,
}

impl IntervalSnapshotStrategy {
    /// Snapshots at every multiple of `interval`. An interval of 0 is treated as 1.
    pub const fn new(interval: u64) -> Self {
        Self {
            interval: if interval == 0 { 1 } else { interval },
        }
    }

    /// The effective interval.
    #[inline]
    pub const fn interval(&self) -> u64 {
        self.interval
    }
}

impl Default for IntervalSnapshotStrategy {
    fn default() -> Self {
        Self::new(CONFIG.snapshots.interval)
    }
}

impl SnapshotStrategy for IntervalSnapshotStrategy {
    fn should_create_snapshot(&self, version: u64) -> bool {
        version > 0 && version % self.interval == 0
    }
}

/// Never snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NeverSnapshotStrategy;

impl SnapshotStrategy for NeverSnapshotStrategy {
    fn should_create_snapshot(&self, _version: u64) -> bool {
        false
    }
}
