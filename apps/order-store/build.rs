//! Build Script for Order Store
//!
//! Handles coverage instrumentation and migration change tracking.
//!
//! `sqlx::migrate!` embeds the `migrations/` directory at compile time, so the
//! crate has to be rebuilt whenever a migration is added or edited.

use std::env;

fn main() {
    // Set profile file pattern for coverage runs
    #[cfg(coverage)]
    {
        println!("cargo:rustc-env=LLVM_PROFILE_FILE=coverage-%p-%m.profraw");
    }

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=migrations");

    // Emit cfg for coverage detection
    // Usage: #[cfg(coverage)] or #[cfg(not(coverage))]
    if env::var("CARGO_LLVM_COV").is_ok()
        || env::var("LLVM_PROFILE_FILE").is_ok()
        || env::var("RUSTFLAGS")
            .map(|f| f.contains("instrument-coverage"))
            .unwrap_or(false)
    {
        println!("cargo:rustc-cfg=coverage");
    }
}
