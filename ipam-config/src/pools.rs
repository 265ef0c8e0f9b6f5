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

use crate::serde_utils::{
    convert_optional_string_with_shellexpand, convert_optional_vec_string_with_shellexpand,
    convert_string_with_shellexpand,
};

/// Addresses seeded into one owner pool when the manager starts.
///
/// **Example JSON Config:**
/// ```json
/// {
///   "name": "cluster-1",
///   "addresses": [
///     { "address": "10.0.0.1", "hostname": "node-1.local", "dns_servers": ["${DNS:-8.8.8.8}"] },
///     { "address": "10.0.0.2" }
///   ]
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct PoolSpec {
    /// Must not be empty.
    pub addresses: Vec<AddressSpec>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct AddressSpec {
    /// The address itself. Not validated; IPv4 and IPv6 literals both work.
    #[serde(deserialize_with = "convert_string_with_shellexpand")]
    pub address: String,

    #[serde(default, deserialize_with = "convert_optional_string_with_shellexpand")]
    pub hostname: Option<String>,

    #[serde(
        default,
        deserialize_with = "convert_optional_vec_string_with_shellexpand"
    )]
    pub dns_servers: Option<Vec<String>>,
}
