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

use std::collections::HashMap;

use ipam_error::{Code, Error, ResultExt, error_if, make_err, make_input_err};
use ipam_util::address::Address;
use ipam_util::storage_trait::{PoolSnapshot, Snapshot};
use tracing::{Level, event};

/// Free and used addresses of one owner key.
///
/// An address key lives in at most one of the two maps.
#[derive(Debug, Default)]
pub struct OwnerPool {
    free: HashMap<String, Address>,
    used: HashMap<String, Address>,
}

impl OwnerPool {
    fn contains(&self, address_key: &str) -> bool {
        self.free.contains_key(address_key) || self.used.contains_key(address_key)
    }

    /// Inserts addresses the pool does not know yet into the free set and
    /// returns how many were inserted.
    pub fn add(&mut self, addresses: &[Address]) -> usize {
        let mut added = 0;
        for address in addresses {
            if self.contains(address.key()) {
                continue;
            }
            self.free.insert(address.key().to_string(), address.clone());
            added += 1;
        }
        added
    }

    pub fn allocate(&mut self) -> Option<Address> {
        let key = self.free.keys().next()?.clone();
        let address = self.free.remove(&key)?;
        self.used.insert(key, address.clone());
        Some(address)
    }

    /// Returns false if `address_key` is not allocated.
    pub fn release(&mut self, address_key: &str) -> bool {
        let Some((key, address)) = self.used.remove_entry(address_key) else {
            return false;
        };
        self.free.insert(key, address);
        true
    }

    /// Removes free addresses from the pool. Nothing is removed unless every
    /// listed address is currently free.
    pub fn remove_addresses(&mut self, addresses: &[Address]) -> Result<usize, Error> {
        for address in addresses {
            let key = address.key();
            if self.used.contains_key(key) {
                return Err(make_err!(
                    Code::AddressInUse,
                    "Address '{key}' is allocated and cannot be removed"
                ));
            }
            if !self.free.contains_key(key) {
                return Err(make_err!(
                    Code::AddressNotFound,
                    "Address '{key}' is not in the pool"
                ));
            }
        }
        Ok(addresses
            .iter()
            .filter(|address| self.free.remove(address.key()).is_some())
            .count())
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    pub fn used_len(&self) -> usize {
        self.used.len()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let mut snapshot = PoolSnapshot {
            free: self.free.values().cloned().collect(),
            used: self.used.values().cloned().collect(),
        };
        snapshot.sort();
        snapshot
    }

    pub fn try_from_snapshot(snapshot: PoolSnapshot) -> Result<Self, Error> {
        let mut pool = Self::default();
        for (addresses, used) in [(snapshot.free, false), (snapshot.used, true)] {
            for address in addresses {
                let key = address.key();
                error_if!(key.is_empty(), "Snapshot contains an address with an empty key");
                error_if!(
                    pool.contains(key),
                    "Address '{key}' is listed more than once in snapshot"
                );
                let target = if used { &mut pool.used } else { &mut pool.free };
                target.insert(key.to_string(), address);
            }
        }
        Ok(pool)
    }
}

/// Owner pools keyed by owner key. Callers provide the locking.
#[derive(Debug, Default)]
pub struct OwnerPools {
    pools: HashMap<String, OwnerPool>,
}

impl OwnerPools {
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&OwnerPool> {
        self.pools.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Result<&mut OwnerPool, Error> {
        self.pools
            .get_mut(key)
            .err_tip_with_code(|_| (Code::KeyNotFound, format!("No address pool for key '{key}'")))
    }

    pub fn add(&mut self, key: &str, addresses: &[Address]) -> Result<(), Error> {
        if addresses.iter().any(|address| address.key().is_empty()) {
            return Err(make_input_err!(
                "Cannot add an address with an empty key to pool '{key}'"
            ));
        }
        let added = self.pools.entry(key.to_string()).or_default().add(addresses);
        event!(
            Level::DEBUG,
            owner = key,
            added,
            skipped = addresses.len() - added,
            "Added addresses to pool"
        );
        Ok(())
    }

    pub fn remove(&mut self, key: &str) {
        if let Some(pool) = self.pools.remove(key) {
            event!(
                Level::INFO,
                owner = key,
                free = pool.free_len(),
                used = pool.used_len(),
                "Removed address pool"
            );
        }
    }

    pub fn remove_addresses(&mut self, key: &str, addresses: &[Address]) -> Result<(), Error> {
        let removed = self
            .get_mut(key)?
            .remove_addresses(addresses)
            .err_tip(|| format!("While removing addresses from pool '{key}'"))?;
        event!(Level::DEBUG, owner = key, removed, "Removed addresses from pool");
        Ok(())
    }

    pub fn allocate(&mut self, key: &str) -> Result<Address, Error> {
        let pool = self.get_mut(key)?;
        let Some(address) = pool.allocate() else {
            event!(
                Level::WARN,
                owner = key,
                used = pool.used_len(),
                "Address pool exhausted"
            );
            return Err(make_err!(
                Code::NotEnoughAddresses,
                "No free address left in pool '{key}'"
            ));
        };
        event!(
            Level::DEBUG,
            owner = key,
            address = address.key(),
            "Allocated address"
        );
        Ok(address)
    }

    pub fn release(&mut self, key: &str, address_key: &str) -> Result<(), Error> {
        if !self.get_mut(key)?.release(address_key) {
            event!(
                Level::WARN,
                owner = key,
                address = address_key,
                "Release of an address that is not allocated"
            );
            return Err(make_err!(
                Code::ReleaseUnallocatedIp,
                "Address '{address_key}' is not allocated from pool '{key}'"
            ));
        }
        event!(
            Level::DEBUG,
            owner = key,
            address = address_key,
            "Released address"
        );
        Ok(())
    }

    pub fn snapshot_into(&self, snapshot: &mut Snapshot) {
        for (key, pool) in &self.pools {
            snapshot.insert(key.clone(), pool.snapshot());
        }
    }

    /// Takes ownership of a restored pool. Replaces any pool already held
    /// under `key`.
    pub fn install(&mut self, key: String, pool: OwnerPool) {
        self.pools.insert(key, pool);
    }
}

/// Validates every pool of `snapshot` before anything is installed, so a
/// malformed snapshot never leaves a storage half-restored.
pub fn restore_pools(snapshot: Snapshot) -> Result<Vec<(String, OwnerPool)>, Error> {
    snapshot
        .into_iter()
        .map(|(key, pool_snapshot)| {
            let pool = OwnerPool::try_from_snapshot(pool_snapshot)
                .err_tip(|| format!("In snapshot of pool '{key}'"))?;
            Ok((key, pool))
        })
        .collect()
}
