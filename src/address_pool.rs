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

use ipam_error::Error;
use ipam_util::address::Address;
use ipam_util::storage_trait::Storage;

/// Allocate/release view of the pool of a single owner key.
///
/// Handles are cheap to clone. Handles bound to the same key share the same
/// engine state and can be used from many threads at once.
#[derive(Clone)]
pub struct AddressPool {
    storage: Arc<dyn Storage>,
    key: String,
}

impl fmt::Debug for AddressPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressPool")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl AddressPool {
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Hands out a free address of this pool and marks it used.
    pub fn allocate(&self) -> Result<Address, Error> {
        self.storage.allocate(&self.key)
    }

    /// Returns `address` to the free set. Only the address key is looked at.
    pub fn release(&self, address: &Address) -> Result<(), Error> {
        self.storage.release(&self.key, address.key())
    }
}
