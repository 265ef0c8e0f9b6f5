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

use std::collections::HashSet;

use ipam_util::address::{Address, KeyFunc, path_key};
use ipam_util::storage_trait::PoolSnapshot;
use pretty_assertions::assert_eq;

#[test]
fn key_is_the_address_verbatim() {
    let address = Address::new("fe80::1")
        .with_hostname("fe80-1.local")
        .with_dns_servers(["8.8.8.8", "8.8.4.4"]);
    assert_eq!(address.key(), "fe80::1");
    assert_eq!(address.hostname(), Some("fe80-1.local"));
    assert_eq!(
        address.dns_servers(),
        Some(&["8.8.8.8".to_string(), "8.8.4.4".to_string()][..])
    );
}

#[test]
fn metadata_does_not_change_identity() {
    let bare = Address::new("1.1.1.1");
    let decorated = Address::new("1.1.1.1")
        .with_hostname("one.local")
        .with_dns_servers(["8.8.8.8"]);
    assert_eq!(bare.key(), decorated.key());
    assert_eq!(bare, decorated);
    assert_ne!(bare, Address::new("1.1.1.2").with_hostname("one.local"));

    let unique: HashSet<_> = [bare, decorated, Address::new("1.1.1.2")]
        .into_iter()
        .collect();
    assert_eq!(unique.len(), 2);
}

#[test]
fn display_includes_hostname_when_present() {
    assert_eq!(Address::new("1.1.1.1").to_string(), "1.1.1.1");
    assert_eq!(
        Address::new("1.1.1.1").with_hostname("1-1-1-1.local").to_string(),
        "1.1.1.1 (1-1-1-1.local)"
    );
}

#[test]
fn path_key_joins_base_and_key() {
    let address = Address::new("10.0.0.7");
    assert_eq!(path_key("/ipam/cluster-1", &address), "/ipam/cluster-1/10.0.0.7");
    assert_eq!(path_key("ipam/cluster-1/", &address), "ipam/cluster-1/10.0.0.7");
    assert_eq!(path_key("", &address), "10.0.0.7");
}

#[test]
fn path_key_cleans_the_result() {
    let address = Address::new("10.0.0.7");
    assert_eq!(path_key("/ipam//free/./", &address), "/ipam/free/10.0.0.7");
    assert_eq!(path_key("/ipam/free/../used", &address), "/ipam/used/10.0.0.7");
    assert_eq!(path_key("/..", &address), "/10.0.0.7");
    assert_eq!(path_key("../pools", &address), "../pools/10.0.0.7");
}

#[test]
fn path_key_of_empty_elements_is_empty() {
    assert_eq!(path_key("", &Address::new("")), "");
}

#[test]
fn path_key_fits_key_func() {
    let key_func: KeyFunc = path_key;
    assert_eq!(key_func("/base", &Address::new("1.2.3.4")), "/base/1.2.3.4");
}

#[test]
fn address_serde_skips_missing_metadata() {
    let json = serde_json::to_string(&Address::new("1.1.1.1")).unwrap();
    assert_eq!(json, r#"{"address":"1.1.1.1"}"#);

    let parsed: Address = serde_json::from_str(
        r#"{"address":"1.1.1.2","hostname":"two.local","dns_servers":["8.8.8.8"]}"#,
    )
    .unwrap();
    assert_eq!(parsed.key(), "1.1.1.2");
    assert_eq!(parsed.hostname(), Some("two.local"));
    assert_eq!(parsed.dns_servers(), Some(&["8.8.8.8".to_string()][..]));
}

#[test]
fn pool_snapshot_sort_orders_by_key() {
    let mut snapshot = PoolSnapshot {
        free: vec![Address::new("1.1.1.3"), Address::new("1.1.1.1")],
        used: vec![Address::new("b"), Address::new("a")],
    };
    snapshot.sort();
    assert_eq!(
        snapshot,
        PoolSnapshot {
            free: vec![Address::new("1.1.1.1"), Address::new("1.1.1.3")],
            used: vec![Address::new("a"), Address::new("b")],
        }
    );
}

#[test]
fn init_tracing_only_once() {
    assert!(ipam_util::init_tracing().is_ok());
    let err = ipam_util::init_tracing().unwrap_err();
    assert_eq!(err.code, ipam_error::Code::Internal);
}
