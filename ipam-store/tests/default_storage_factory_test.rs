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
use ipam_config::storage::{MemorySpec, ShardedSpec, StorageSpec};
use ipam_error::{Code, Error};
use ipam_macro::ipam_test;
use ipam_store::default_storage_factory::storage_factory;
use ipam_util::address::Address;
use ipam_util::storage_trait::Storage;
use pretty_assertions::assert_eq;

fn exercise(storage: &dyn Storage) -> Result<(), Error> {
    storage.add("cluster-1", &[Address::new("10.1.0.1")])?;
    let address = storage.allocate("cluster-1")?;
    assert_eq!(address.key(), "10.1.0.1");
    assert_eq!(
        storage.allocate("cluster-1").unwrap_err().code,
        Code::NotEnoughAddresses
    );
    storage.release("cluster-1", address.key())
}

#[ipam_test]
async fn creates_memory_storage() -> Result<(), Error> {
    let storage = storage_factory(&StorageSpec::Memory(MemorySpec::default()))?;
    exercise(&*storage)?;
    assert_eq!(storage.snapshot()?.len(), 1);
    Ok(())
}

#[ipam_test]
async fn creates_sharded_storage() -> Result<(), Error> {
    let storage = storage_factory(&StorageSpec::Sharded(ShardedSpec { shards: 3 }))?;
    exercise(&*storage)?;
    assert_eq!(storage.snapshot()?["cluster-1"].free.len(), 1);
    Ok(())
}

#[ipam_test]
async fn default_spec_is_memory() -> Result<(), Error> {
    assert!(matches!(StorageSpec::default(), StorageSpec::Memory(_)));
    let storage = storage_factory(&StorageSpec::default())?;
    exercise(&*storage)
}

#[ipam_test]
async fn zero_shards_is_propagated() -> Result<(), Error> {
    let Err(err) = storage_factory(&StorageSpec::Sharded(ShardedSpec { shards: 0 })) else {
        panic!("Expected an error for zero shards");
    };
    assert_eq!(err.code, Code::InvalidArgument);
    assert!(
        err.message_string().contains("Could not create ShardedStorage"),
        "Unexpected message: {err}"
    );
    Ok(())
}
