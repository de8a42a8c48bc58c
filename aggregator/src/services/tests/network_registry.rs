//! Tests for the network node registry

use std::collections::HashMap;
use std::sync::Arc;

use shared::{NetworkId, NodeType};

use crate::services::network_registry::{discover_runner_ip, NetworkRegistry};
use crate::testutil::registry;

#[test]
fn resolve_returns_registered_container() {
    let reg = registry("192.168.65.2");
    let network = NetworkId::from("frontend");
    reg.register_container(&network, "172.18.0.2".parse().unwrap(), "svc-a");

    let node = reg.resolve(&network, "172.18.0.2".parse().unwrap()).unwrap();
    assert_eq!(node.node_type, NodeType::Container);
    assert_eq!(node.display_name, "svc-a");
    assert_eq!(node.ip_address, Some("172.18.0.2".parse().unwrap()));
}

#[test]
fn reregistration_is_last_writer_wins() {
    let reg = registry("192.168.65.2");
    let network = NetworkId::from("frontend");
    let ip = "172.18.0.2".parse().unwrap();

    reg.register_container(&network, ip, "svc-a");
    reg.register_container(&network, ip, "svc-a-restarted");

    let node = reg.resolve(&network, ip).unwrap();
    assert_eq!(node.display_name, "svc-a-restarted");
}

#[test]
fn same_ip_in_different_networks_stays_distinct() {
    let reg = registry("192.168.65.2");
    let ip = "172.18.0.2".parse().unwrap();
    reg.register_container(&NetworkId::from("frontend"), ip, "web");
    reg.register_container(&NetworkId::from("backend"), ip, "db");

    assert_eq!(reg.resolve(&NetworkId::from("frontend"), ip).unwrap().display_name, "web");
    assert_eq!(reg.resolve(&NetworkId::from("backend"), ip).unwrap().display_name, "db");
}

#[test]
fn concurrent_registration_keeps_all_entries() {
    let reg = Arc::new(registry("192.168.65.2"));
    let network = NetworkId::from("frontend");

    let handles: Vec<_> = (0..16u8)
        .map(|i| {
            let reg = Arc::clone(&reg);
            let network = network.clone();
            std::thread::spawn(move || {
                let ip = format!("172.18.0.{}", i + 2).parse().unwrap();
                reg.register_container(&network, ip, &format!("svc-{i}"));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..16u8 {
        let ip = format!("172.18.0.{}", i + 2).parse().unwrap();
        assert!(reg.resolve(&network, ip).is_some());
    }
    assert_eq!(reg.networks(), vec![network]);
}

#[test]
fn runner_node_is_created_once() {
    let reg = registry("192.168.65.2");

    let first = reg.runner_node();
    let second = reg.runner_node();

    assert_eq!(first.id, second.id);
    assert_eq!(first.node_type, NodeType::TestRunner);
    assert_eq!(first.ip_address, Some("192.168.65.2".parse().unwrap()));
}

#[test]
fn mock_host_lookup_is_case_insensitive() {
    let mocks = HashMap::from([("Payments.Mock".to_string(), "payments stub".to_string())]);
    let reg = NetworkRegistry::new("192.168.65.2".parse().unwrap(), &mocks);

    let node = reg.resolve_mock_host("PAYMENTS.mock").unwrap();
    assert_eq!(node.node_type, NodeType::MockServer);
    assert_eq!(node.display_name, "payments stub");
    assert!(node.ip_address.is_none());
    assert!(reg.has_mock_hosts());
}

#[test]
fn networks_covers_gateway_only_networks() {
    let reg = registry("192.168.65.2");
    reg.register_container(&NetworkId::from("backend"), "172.19.0.2".parse().unwrap(), "svc");
    reg.register_gateway(&NetworkId::from("edge"), "172.20.0.1".parse().unwrap());

    assert_eq!(reg.networks(), vec![NetworkId::from("backend"), NetworkId::from("edge")]);
}

#[test]
fn nodes_receive_distinct_palette_colors() {
    let reg = registry("192.168.65.2");
    let network = NetworkId::from("frontend");
    reg.register_container(&network, "172.18.0.2".parse().unwrap(), "a");
    reg.register_container(&network, "172.18.0.3".parse().unwrap(), "b");

    let a = reg.resolve(&network, "172.18.0.2".parse().unwrap()).unwrap();
    let b = reg.resolve(&network, "172.18.0.3".parse().unwrap()).unwrap();
    assert_ne!(a.color, b.color);
}

#[test]
fn override_short_circuits_discovery() {
    let (ip, warning) = discover_runner_ip(Some("10.0.0.42".parse().unwrap()));
    assert_eq!(ip, "10.0.0.42".parse::<std::net::IpAddr>().unwrap());
    assert!(warning.is_none());
}
