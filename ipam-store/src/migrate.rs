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

use ipam_error::{Error, ResultExt};
use ipam_util::storage_trait::ExtraStorage;
use tracing::{Level, event};

/// Copies every owner pool of `from` into `to`, keeping which addresses are
/// free and which are used. `to` must be empty. Returns the number of pools
/// copied.
///
/// The snapshot of `from` and the recover into `to` are each atomic, but not
/// together: changes made to `from` after its snapshot was taken are not
/// carried over.
pub fn migrate(from: &dyn ExtraStorage, to: &dyn ExtraStorage) -> Result<usize, Error> {
    let snapshot = from
        .snapshot()
        .err_tip(|| "While taking snapshot of source storage in migrate")?;
    let pool_count = snapshot.len();
    to.recover(snapshot)
        .err_tip(|| "While recovering target storage in migrate")?;
    event!(Level::INFO, pool_count, "Migrated address pools");
    Ok(pool_count)
}
