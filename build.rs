//! Set up linker scripts for the RP2350 firmware and validate the build-time configuration

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

#[allow(dead_code)]
#[path = "src/levels.rs"]
mod levels;

fn main() {
    // Put the linker script somewhere the linker can find it
    let out = PathBuf::from(std::env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
    println!("cargo:rustc-link-search={}", out.display());

    // The file `memory.x` is loaded by cortex-m-rt's `link.x` script
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out.join("memory.x")).expect("Unable to create memory.x");
    f.write_all(memory_x).expect("Unable to write memory.x");
    println!("cargo:rerun-if-changed=memory.x");

    // Only the bare-metal firmware links against cortex-m-rt and defmt. Host builds
    // (the library and its tests) must not see these scripts.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("none") {
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/levels.rs");

    // check if the optional config env vars are sane
    if let Ok(volts) = std::env::var("VREG_BOOT_VOLTAGE") {
        let volts = volts
            .trim()
            .parse::<f32>()
            .expect("VREG_BOOT_VOLTAGE is not a voltage in volts, e.g. 1.10");
        assert!(
            levels::supported_level_index(volts).is_some(),
            "VREG_BOOT_VOLTAGE={} is not supported, valid inputs are {:.2} ~ {:.2} with a {:.2} increment each step",
            volts,
            levels::MIN_SUPPORTED_VOLTAGE,
            levels::MAX_SUPPORTED_VOLTAGE,
            levels::VOLTAGE_STEP
        );
    }
    if let Ok(unlock) = std::env::var("VREG_UNLOCK_ON_BOOT") {
        assert!(
            unlock == "0" || unlock == "1",
            "VREG_UNLOCK_ON_BOOT must be 0 or 1"
        );
    }

    println!("cargo::rerun-if-env-changed=VREG_BOOT_VOLTAGE");
    println!("cargo::rerun-if-env-changed=VREG_UNLOCK_ON_BOOT");

    built::write_built_file().expect("Failed to acquire build-time information");

    // Make sure we get rerun when the git commit changes.
    // We want to watch two files: HEAD, which tracks which branch we are on,
    // and the file for that branch that tracks which commit is is on.
    let git_head_file = PathBuf::from(".git/HEAD");
    if git_head_file.exists() {
        println!("cargo::rerun-if-changed={}", git_head_file.display());

        let git_head_ref = fs::read_to_string(git_head_file).expect("Unable to read HEAD ref");

        let v: Vec<&str> = git_head_ref.trim().split("ref: ").collect();
        if v[0].is_empty() {
            // this is only true if HEAD begins with "ref:", if false HEAD is detached
            let git_head_ref = v[1];

            let git_head_ref_file = PathBuf::from(".git").join(git_head_ref);
            if git_head_ref_file.exists() {
                println!("cargo::rerun-if-changed={}", git_head_ref_file.display());
            }
        }
    }
}
