//! Build script for dfix.
//!
//! This script generates the man page at build time using clap_mangen.
//! The generated man page is placed in OUT_DIR for inclusion in release builds.
//!
//! Note: We build a minimal command structure here rather than importing from
//! the main crate, since build scripts cannot depend on the crate being built.

use clap::{Arg, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

/// Build the CLI command structure for man page generation.
///
/// IMPORTANT: Keep this structure synchronized with src/cli.rs
fn build_cli() -> Command {
    Command::new("dfix")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run the embedded discovery store fixture")
        .long_about("Start, inspect and stop the embedded store fixture used by discovery test suites")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress non-essential output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommands(vec![
            Command::new("serve")
                .about("Start the fixture and keep it running until stdin closes")
                .long_about("Start the embedded server, print its ports and data directory, and stop it on EOF or 'stop'"),
            Command::new("probe")
                .about("Print free ephemeral ports")
                .long_about("Probe mutually distinct TCP ports that are free at the time of the call"),
            Command::new("config")
                .about("Print the effective fixture configuration")
                .long_about("Show the configuration after environment and flag overrides"),
        ])
}

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).unwrap();

    fs::write(man_dir.join("dfix.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}
