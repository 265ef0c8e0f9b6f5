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

use core::hash::Hasher;
use std::hash::DefaultHasher;
use std::sync::Arc;

use ipam_config::storage::ShardedSpec;
use ipam_error::{Code, Error, ResultExt, error_if, make_err};
use ipam_util::address::Address;
use ipam_util::storage_trait::{ExtraStorage, Snapshot, Storage};
use parking_lot::{Mutex, MutexGuard};
use tracing::{Level, event};

use crate::owner_pool::{OwnerPools, restore_pools};

/// In-memory storage that stripes owner pools over independently locked
/// shards. Every owner key maps to exactly one shard, so each operation
/// holds one lock. Snapshot and recover hold all of them, acquired in index
/// order.
#[derive(Debug)]
pub struct ShardedStorage {
    shards: Vec<Mutex<OwnerPools>>,
}

impl ShardedStorage {
    pub fn new(spec: &ShardedSpec) -> Result<Arc<Self>, Error> {
        error_if!(
            spec.shards == 0,
            "ShardedStorage must have at least one shard"
        );
        Ok(Arc::new(Self {
            shards: (0..spec.shards)
                .map(|_| Mutex::new(OwnerPools::default()))
                .collect(),
        }))
    }

    pub const fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn get_shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        hasher.write(key.as_bytes());
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    fn get_shard(&self, key: &str) -> &Mutex<OwnerPools> {
        &self.shards[self.get_shard_index(key)]
    }

    fn lock_all(&self) -> Vec<MutexGuard<'_, OwnerPools>> {
        self.shards.iter().map(|shard| shard.lock()).collect()
    }

    /// Returns the number of free and used addresses of the pool for `key`.
    /// Function is not for production code paths.
    pub fn pool_len_for_test(&self, key: &str) -> Option<(usize, usize)> {
        self.get_shard(key)
            .lock()
            .get(key)
            .map(|pool| (pool.free_len(), pool.used_len()))
    }
}

impl Storage for ShardedStorage {
    fn add(&self, key: &str, addresses: &[Address]) -> Result<(), Error> {
        self.get_shard(key)
            .lock()
            .add(key, addresses)
            .err_tip(|| "In ShardedStorage::add")
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.get_shard(key).lock().remove(key);
        Ok(())
    }

    fn remove_addresses(&self, key: &str, addresses: &[Address]) -> Result<(), Error> {
        self.get_shard(key)
            .lock()
            .remove_addresses(key, addresses)
            .err_tip(|| "In ShardedStorage::remove_addresses")
    }

    fn allocate(&self, key: &str) -> Result<Address, Error> {
        self.get_shard(key)
            .lock()
            .allocate(key)
            .err_tip(|| "In ShardedStorage::allocate")
    }

    fn release(&self, key: &str, address_key: &str) -> Result<(), Error> {
        self.get_shard(key)
            .lock()
            .release(key, address_key)
            .err_tip(|| "In ShardedStorage::release")
    }
}

impl ExtraStorage for ShardedStorage {
    fn snapshot(&self) -> Result<Snapshot, Error> {
        let shards = self.lock_all();
        let mut snapshot = Snapshot::new();
        for shard in &shards {
            shard.snapshot_into(&mut snapshot);
        }
        Ok(snapshot)
    }

    fn recover(&self, snapshot: Snapshot) -> Result<(), Error> {
        let mut shards = self.lock_all();
        if shards.iter().any(|shard| !shard.is_empty()) {
            return Err(make_err!(
                Code::FailedPrecondition,
                "ShardedStorage must be empty to recover from a snapshot"
            ));
        }
        let restored = restore_pools(snapshot).err_tip(|| "In ShardedStorage::recover")?;
        let pool_count = restored.len();
        for (key, pool) in restored {
            let index = self.get_shard_index(&key);
            shards[index].install(key, pool);
        }
        event!(
            Level::INFO,
            pool_count,
            shards = shards.len(),
            "Recovered ShardedStorage from snapshot"
        );
        Ok(())
    }
}
