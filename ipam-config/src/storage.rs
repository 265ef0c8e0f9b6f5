// Copyright 2024 The NativeLink Authors. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};

use crate::serde_utils::convert_numeric_with_shellexpand;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub enum StorageSpec {
    /// Keeps every owner pool in one map guarded by a single lock. Every
    /// operation on every owner key is serialized.
    ///
    /// **Example JSON Config:**
    /// ```json
    /// "memory": {}
    /// ```
    ///
    Memory(MemorySpec),

    /// Spreads owner pools over a fixed number of independently locked
    /// shards, picked by hashing the owner key. Operations on owner keys
    /// that land in different shards do not contend.
    ///
    /// **Example JSON Config:**
    /// ```json
    /// "sharded": {
    ///   "shards": 32
    /// }
    /// ```
    ///
    Sharded(ShardedSpec),
}

impl Default for StorageSpec {
    fn default() -> Self {
        Self::Memory(MemorySpec::default())
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct MemorySpec {}

const fn default_shards() -> usize {
    16
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ShardedSpec {
    /// Number of shards. Must be greater than zero.
    ///
    /// Default: 16
    #[serde(
        default = "default_shards",
        deserialize_with = "convert_numeric_with_shellexpand"
    )]
    pub shards: usize,
}

impl Default for ShardedSpec {
    fn default() -> Self {
        Self {
            shards: default_shards(),
        }
    }
}
