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

use core::fmt;
use core::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An IP address together with the network configuration handed out with it.
///
/// The address string is opaque: it is never parsed or validated, so IPv4,
/// IPv6 or any other literal works. Two records with the same address are
/// the same entity no matter what their hostname or DNS servers say.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Address {
    address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    hostname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    dns_servers: Option<Vec<String>>,
}

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostname: None,
            dns_servers: None,
        }
    }

    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    #[must_use]
    pub fn with_dns_servers<I, S>(mut self, dns_servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dns_servers = Some(dns_servers.into_iter().map(Into::into).collect());
        self
    }

    /// Key the record is stored under. This is the address verbatim.
    #[inline]
    pub fn key(&self) -> &str {
        &self.address
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn dns_servers(&self) -> Option<&[String]> {
        self.dns_servers.as_deref()
    }
}

// Identity is the address alone, metadata is ignored.
impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)?;
        if let Some(hostname) = &self.hostname {
            write!(f, " ({hostname})")?;
        }
        Ok(())
    }
}

/// Derives a key for an [`Address`] below `base`, for backends that lay out
/// records hierarchically such as a key/value store.
pub type KeyFunc = fn(base: &str, address: &Address) -> String;

/// Joins `base` and the address key with `/` and lexically cleans the result.
///
/// Empty elements are skipped; if every element is empty the result is empty.
pub fn path_key(base: &str, address: &Address) -> String {
    let elements: Vec<&str> = [base, address.key()]
        .into_iter()
        .filter(|element| !element.is_empty())
        .collect();
    if elements.is_empty() {
        return String::new();
    }
    clean_path(&elements.join("/"))
}

fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(last) if *last != ".." => {
                    parts.pop();
                }
                // `..` cannot climb above the root.
                _ if rooted => {}
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }
    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
