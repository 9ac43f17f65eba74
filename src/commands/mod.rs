//! CLI commands for release-bazel
//!
//! - **release**: the release checklist (workspace check, version and ancestry
//!   guards, update, verification, CL reminder)

pub mod release;

pub use release::run_release;
