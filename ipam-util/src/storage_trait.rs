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

use ipam_error::Error;
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Owner key of the single pool shared by callers that do not partition
/// addresses by owner.
pub const GLOBAL_POOL: &str = "";

/// Tracks, per owner key, which addresses are free and which are in use.
///
/// Every address key of an owner pool is in at most one of the two sets.
/// Implementations must make each call atomic with respect to every other
/// call on the same instance, and must be usable from many threads at once.
pub trait Storage: Send + Sync + 'static {
    /// Adds `addresses` to the free set of the pool for `key`, creating the
    /// pool if needed. Addresses the pool already knows, free or used, are
    /// skipped and keep their existing record. An address with an empty key
    /// fails the call with `InvalidArgument` before anything is inserted.
    fn add(&self, key: &str, addresses: &[Address]) -> Result<(), Error>;

    /// Drops the pool for `key` with everything in it. Unknown keys are a
    /// no-op.
    fn remove(&self, key: &str) -> Result<(), Error>;

    /// Removes the listed addresses from the pool for `key`. Fails without
    /// removing anything if one of them is allocated or unknown to the pool.
    fn remove_addresses(&self, key: &str, addresses: &[Address]) -> Result<(), Error>;

    /// Moves one free address of the pool for `key` to the used set and
    /// returns a copy of it. Which address is picked is unspecified.
    fn allocate(&self, key: &str) -> Result<Address, Error>;

    /// Moves the allocated address with key `address_key` back to the free
    /// set of the pool for `key`.
    fn release(&self, key: &str, address_key: &str) -> Result<(), Error>;
}

/// Content of one owner pool at the time of a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    #[serde(default)]
    pub free: Vec<Address>,
    #[serde(default)]
    pub used: Vec<Address>,
}

impl PoolSnapshot {
    /// Sorts both lists by address key so snapshots compare deterministically.
    pub fn sort(&mut self) {
        self.free.sort_by(|a, b| a.key().cmp(b.key()));
        self.used.sort_by(|a, b| a.key().cmp(b.key()));
    }
}

/// Every owner pool of a storage, keyed by owner key.
pub type Snapshot = HashMap<String, PoolSnapshot>;

/// Storage that can export its full state and load it back, possibly into a
/// different implementation.
pub trait ExtraStorage: Storage {
    /// Captures all owner pools atomically. Lists are sorted by address key.
    fn snapshot(&self) -> Result<Snapshot, Error>;

    /// Loads `snapshot` into this storage, keeping the free/used split of
    /// every pool. The storage must not hold any pool yet.
    fn recover(&self, snapshot: Snapshot) -> Result<(), Error>;
}
