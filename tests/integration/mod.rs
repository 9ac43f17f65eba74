//! Integration tests for release-bazel
//!
//! Each test builds an AOSP-shaped checkout in a temp dir with shell-script
//! stand-ins for the update and verification steps, and (where the ancestry
//! check runs) a local git repository as the upstream.

#![cfg(unix)]

mod helpers;
mod test_logging;
mod test_release;
