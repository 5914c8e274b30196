//! Tests for the process-wide shared fixture.
//!
//! The shared controller is a static, so the whole lifecycle is exercised in
//! a single test to keep ordering deterministic.

use std::io::Read;
use std::net::{Ipv4Addr, TcpStream};

use discovery_fixture::shared;

#[test]
fn test_shared_lifecycle() {
    assert!(shared::server_info().unwrap_err().is_not_started());
    assert!(shared::try_shutdown().unwrap_err().is_not_started());

    shared::try_initialize().unwrap();
    shared::try_initialize().unwrap();

    let port = shared::server_info().unwrap().rpc_port();
    let mut greeting = String::new();
    TcpStream::connect((Ipv4Addr::LOCALHOST, port.value()))
        .unwrap()
        .read_to_string(&mut greeting)
        .unwrap();
    assert!(!greeting.is_empty());

    shared::try_shutdown().unwrap();
    shared::try_shutdown().unwrap();
    assert!(std::ptr::eq(shared::fixture(), shared::fixture()));
}
