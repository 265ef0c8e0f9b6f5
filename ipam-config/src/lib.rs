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

pub mod pools;
pub mod serde_utils;
pub mod storage;

use ipam_error::{Error, ResultExt};
use serde::{Deserialize, Serialize};

use crate::pools::PoolSpec;
use crate::storage::StorageSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedConfig<Spec> {
    pub name: String,
    #[serde(flatten)]
    pub spec: Spec,
}

/// A pool is named after its owner key. The empty name is the global pool.
pub type PoolConfig = NamedConfig<PoolSpec>;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpamConfig {
    /// Backend holding the free and used addresses.
    ///
    /// Default: `memory`
    #[serde(default)]
    pub storage: StorageSpec,

    /// Pools seeded at startup.
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
}

impl IpamConfig {
    /// # Errors
    ///
    /// Will return `Err` if we can't load or parse the file.
    pub fn try_from_json5_file(config_file: &str) -> Result<Self, Error> {
        let json_contents = std::fs::read_to_string(config_file)
            .err_tip(|| format!("Could not open config file {config_file}"))?;
        serde_json5::from_str(&json_contents)
            .err_tip(|| format!("Could not parse config file {config_file}"))
    }
}
