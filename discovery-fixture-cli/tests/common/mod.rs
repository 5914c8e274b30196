//! Common test utilities for CLI integration tests.

use assert_cmd::Command;

/// Fixture environment variables cleared for every test command.
const FIXTURE_ENV: [&str; 7] = [
    "DISCOVERY_FIXTURE_CLUSTER_NAME",
    "DISCOVERY_FIXTURE_SEEDS",
    "DISCOVERY_FIXTURE_PORT_STRATEGY",
    "DISCOVERY_FIXTURE_ENVIRONMENT",
    "DISCOVERY_FIXTURE_POOL",
    "DISCOVERY_FIXTURE_TEMP_ROOT",
    "DISCOVERY_FIXTURE_LOG_MODE",
];

/// Get a dfix command with the fixture environment cleared.
pub fn dfix() -> Command {
    let mut cmd = Command::cargo_bin("dfix").expect("Failed to find dfix binary");
    for key in FIXTURE_ENV {
        cmd.env_remove(key);
    }
    cmd
}
