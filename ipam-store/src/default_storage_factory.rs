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

use ipam_config::storage::StorageSpec;
use ipam_error::{Error, ResultExt};
use ipam_util::storage_trait::ExtraStorage;

use crate::memory_storage::MemoryStorage;
use crate::sharded_storage::ShardedStorage;

pub fn storage_factory(spec: &StorageSpec) -> Result<Arc<dyn ExtraStorage>, Error> {
    let storage: Arc<dyn ExtraStorage> = match spec {
        StorageSpec::Memory(spec) => MemoryStorage::new(spec),
        StorageSpec::Sharded(spec) => {
            ShardedStorage::new(spec).err_tip(|| "Could not create ShardedStorage")?
        }
    };
    Ok(storage)
}
