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
use std::sync::Arc;

use ipam_config::IpamConfig;
use ipam_config::pools::AddressSpec;
use ipam_error::{Code, Error, ResultExt, make_err};
use ipam_store::default_storage_factory::storage_factory;
use ipam_util::address::Address;
use ipam_util::storage_trait::Storage;
use tracing::{Level, event};

use crate::address_pool::AddressPool;

/// Entry point for callers: seeds and tears down owner pools, and hands out
/// [`AddressPool`] handles to allocate from them.
#[derive(Clone)]
pub struct IpManager {
    storage: Arc<dyn Storage>,
}

impl fmt::Debug for IpManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpManager").finish_non_exhaustive()
    }
}

impl IpManager {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Builds the configured storage and seeds every configured pool.
    ///
    /// Fails with `EmptyAddressPool` if a pool lists no addresses. Pools
    /// are checked before anything is seeded.
    pub fn from_config(config: &IpamConfig) -> Result<Self, Error> {
        for pool in &config.pools {
            if pool.spec.addresses.is_empty() {
                return Err(make_err!(
                    Code::EmptyAddressPool,
                    "Pool '{}' in config has no addresses",
                    pool.name
                ));
            }
        }

        let storage = storage_factory(&config.storage).err_tip(|| "Failed to create storage")?;
        let manager = Self::new(storage);
        for pool in &config.pools {
            let addresses: Vec<Address> =
                pool.spec.addresses.iter().map(address_from_spec).collect();
            manager
                .add(&pool.name, &addresses)
                .err_tip(|| format!("Failed to seed pool '{}'", pool.name))?;
        }
        event!(
            Level::INFO,
            pools = config.pools.len(),
            "IpManager seeded from config"
        );
        Ok(manager)
    }

    /// Adds `addresses` as free addresses of the pool for `key`. Addresses
    /// the pool already holds are left alone.
    pub fn add(&self, key: &str, addresses: &[Address]) -> Result<(), Error> {
        self.storage.add(key, addresses)
    }

    /// Removes the listed addresses from the pool for `key`. Nothing is
    /// removed if one of them is allocated or not in the pool.
    pub fn remove(&self, key: &str, addresses: &[Address]) -> Result<(), Error> {
        self.storage.remove_addresses(key, addresses)
    }

    /// Drops the pool for `key` including its allocated addresses.
    pub fn remove_all(&self, key: &str) -> Result<(), Error> {
        self.storage.remove(key)
    }

    pub fn address_pool(&self, key: &str) -> AddressPool {
        AddressPool::new(self.storage.clone(), key)
    }
}

fn address_from_spec(spec: &AddressSpec) -> Address {
    let mut address = Address::new(spec.address.clone());
    if let Some(hostname) = &spec.hostname {
        address = address.with_hostname(hostname.clone());
    }
    if let Some(dns_servers) = &spec.dns_servers {
        address = address.with_dns_servers(dns_servers.iter().cloned());
    }
    address
}
