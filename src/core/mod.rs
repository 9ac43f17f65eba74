//! Core building blocks for release-bazel
//!
//! - **ancestry**: upstream clone + "is the target newer" check
//! - **config**: paths, patterns and commands for the checkout (optional TOML overrides)
//! - **context**: release context threaded through every step (root, config, dry-run, scratch dir)
//! - **error**: error taxonomy with contextual help messages
//! - **exec**: subprocess execution capability (real and recording executors)
//! - **prompt**: yes/no confirmations over any line source
//! - **runner**: external step execution with log capture and dry-run
//! - **vcs**: git operations (SystemGit)
//! - **version**: current prebuilt version discovery
//! - **workspace**: workspace root verification

pub mod ancestry;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod prompt;
pub mod runner;
pub mod vcs;
pub mod version;
pub mod workspace;
