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

use ipam_config::IpamConfig;
use ipam_config::storage::StorageSpec;
use ipam_error::Code;
use pretty_assertions::assert_eq;

#[test]
fn test_empty_config_uses_memory_storage() {
    let config: IpamConfig = serde_json5::from_str("{}").unwrap();
    assert!(matches!(config.storage, StorageSpec::Memory(_)));
    assert!(config.pools.is_empty());
}

#[test]
fn test_sharded_storage_with_default_shards() {
    let config: IpamConfig = serde_json5::from_str(r#"{ storage: { sharded: {} } }"#).unwrap();
    let StorageSpec::Sharded(spec) = config.storage else {
        panic!("Expected sharded storage, got {:?}", config.storage);
    };
    assert_eq!(spec.shards, 16);
}

#[test]
fn test_sharded_storage_shards_from_string() {
    let config: IpamConfig =
        serde_json5::from_str(r#"{ storage: { sharded: { shards: "4" } } }"#).unwrap();
    let StorageSpec::Sharded(spec) = config.storage else {
        panic!("Expected sharded storage, got {:?}", config.storage);
    };
    assert_eq!(spec.shards, 4);
}

#[test]
fn test_pools_deserialize_with_optional_metadata() {
    let example = r#"
        {
            storage: { memory: {} },
            pools: [
                {
                    name: "cluster-1",
                    addresses: [
                        { address: "1.1.1.1", hostname: "1-1-1-1.local", dns_servers: ["8.8.8.8"] },
                        { address: "1.1.1.2" },
                    ],
                },
                { name: "", addresses: [{ address: "fd00::1" }] },
            ],
        }
    "#;
    let config: IpamConfig = serde_json5::from_str(example).unwrap();
    assert_eq!(config.pools.len(), 2);

    let cluster = &config.pools[0];
    assert_eq!(cluster.name, "cluster-1");
    assert_eq!(cluster.spec.addresses.len(), 2);
    assert_eq!(cluster.spec.addresses[0].address, "1.1.1.1");
    assert_eq!(
        cluster.spec.addresses[0].hostname.as_deref(),
        Some("1-1-1-1.local")
    );
    assert_eq!(
        cluster.spec.addresses[0].dns_servers,
        Some(vec!["8.8.8.8".to_string()])
    );
    assert_eq!(cluster.spec.addresses[1].hostname, None);
    assert_eq!(cluster.spec.addresses[1].dns_servers, None);

    let global = &config.pools[1];
    assert_eq!(global.name, "");
    assert_eq!(global.spec.addresses[0].address, "fd00::1");
}

#[test]
fn test_address_fields_are_shell_expanded() {
    // SAFETY: No other test in this binary reads this variable.
    unsafe {
        std::env::set_var("IPAM_CONFIG_TEST_DNS", "9.9.9.9");
    }
    let example = r#"
        {
            pools: [{
                name: "cluster-1",
                addresses: [{
                    address: "${IPAM_CONFIG_TEST_ADDRESS:-10.0.0.1}",
                    dns_servers: ["$IPAM_CONFIG_TEST_DNS"],
                }],
            }],
        }
    "#;
    let config: IpamConfig = serde_json5::from_str(example).unwrap();
    let address = &config.pools[0].spec.addresses[0];
    assert_eq!(address.address, "10.0.0.1");
    assert_eq!(address.dns_servers, Some(vec!["9.9.9.9".to_string()]));
}

#[test]
fn test_unknown_address_field_is_rejected() {
    let example = r#"{ pools: [{ name: "a", addresses: [{ address: "1.1.1.1", mac: "x" }] }] }"#;
    assert!(serde_json5::from_str::<IpamConfig>(example).is_err());
}

#[test]
fn test_missing_config_file_is_an_error() {
    let err = IpamConfig::try_from_json5_file("/nonexistent/ipam.json5").unwrap_err();
    assert_eq!(err.code, Code::Internal);
    assert!(
        err.message_string()
            .contains("Could not open config file /nonexistent/ipam.json5"),
        "Unexpected message: {err}"
    );
}

#[test]
fn test_config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("ipam-config-test-{}.json5", std::process::id()));
    std::fs::write(
        &path,
        r#"{ storage: { sharded: { shards: 2 } }, pools: [{ name: "c", addresses: [{ address: "1.2.3.4" }] }] }"#,
    )
    .unwrap();
    let config = IpamConfig::try_from_json5_file(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();

    let StorageSpec::Sharded(spec) = config.storage else {
        panic!("Expected sharded storage, got {:?}", config.storage);
    };
    assert_eq!(spec.shards, 2);
    assert_eq!(config.pools[0].spec.addresses[0].address, "1.2.3.4");
}
