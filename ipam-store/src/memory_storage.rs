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

use std::sync::Arc;

use ipam_config::storage::MemorySpec;
use ipam_error::{Code, Error, ResultExt, make_err};
use ipam_util::address::Address;
use ipam_util::storage_trait::{ExtraStorage, Snapshot, Storage};
use parking_lot::Mutex;
use tracing::{Level, event};

use crate::owner_pool::{OwnerPools, restore_pools};

/// In-memory storage. A single lock guards the pools of every owner key, so
/// all operations are serialized.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    pools: Mutex<OwnerPools>,
}

impl MemoryStorage {
    pub fn new(_spec: &MemorySpec) -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns the number of free and used addresses of the pool for `key`.
    /// Function is not for production code paths.
    pub fn pool_len_for_test(&self, key: &str) -> Option<(usize, usize)> {
        self.pools
            .lock()
            .get(key)
            .map(|pool| (pool.free_len(), pool.used_len()))
    }
}

impl Storage for MemoryStorage {
    fn add(&self, key: &str, addresses: &[Address]) -> Result<(), Error> {
        self.pools
            .lock()
            .add(key, addresses)
            .err_tip(|| "In MemoryStorage::add")
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.pools.lock().remove(key);
        Ok(())
    }

    fn remove_addresses(&self, key: &str, addresses: &[Address]) -> Result<(), Error> {
        self.pools
            .lock()
            .remove_addresses(key, addresses)
            .err_tip(|| "In MemoryStorage::remove_addresses")
    }

    fn allocate(&self, key: &str) -> Result<Address, Error> {
        self.pools
            .lock()
            .allocate(key)
            .err_tip(|| "In MemoryStorage::allocate")
    }

    fn release(&self, key: &str, address_key: &str) -> Result<(), Error> {
        self.pools
            .lock()
            .release(key, address_key)
            .err_tip(|| "In MemoryStorage::release")
    }
}

impl ExtraStorage for MemoryStorage {
    fn snapshot(&self) -> Result<Snapshot, Error> {
        let mut snapshot = Snapshot::new();
        self.pools.lock().snapshot_into(&mut snapshot);
        Ok(snapshot)
    }

    fn recover(&self, snapshot: Snapshot) -> Result<(), Error> {
        let mut pools = self.pools.lock();
        if !pools.is_empty() {
            return Err(make_err!(
                Code::FailedPrecondition,
                "MemoryStorage must be empty to recover from a snapshot"
            ));
        }
        let restored = restore_pools(snapshot).err_tip(|| "In MemoryStorage::recover")?;
        let pool_count = restored.len();
        for (key, pool) in restored {
            pools.install(key, pool);
        }
        event!(Level::INFO, pool_count, "Recovered MemoryStorage from snapshot");
        Ok(())
    }
}
