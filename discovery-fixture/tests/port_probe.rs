//! Integration tests for ephemeral port probing.

use std::collections::HashSet;

use discovery_fixture::port::{find_unused_port, find_unused_ports};

#[test]
fn test_probed_port_is_free_after_release() {
    let port = find_unused_port().unwrap();
    assert!(
        port_selector::is_free_tcp(port.value()),
        "port {port} should be free once the probe is released"
    );
}

#[test]
fn test_pair_is_distinct_and_free() {
    let ports = find_unused_ports(2).unwrap();
    assert_ne!(ports[0], ports[1]);
    for port in ports {
        assert!(port_selector::is_free_tcp(port.value()));
    }
}

#[test]
fn test_repeated_pairs_never_collide_within_a_call() {
    for _ in 0..32 {
        let ports = find_unused_ports(4).unwrap();
        let unique: HashSet<_> = ports.iter().collect();
        assert_eq!(unique.len(), 4);
    }
}
