//! Integration tests for diagnostic log filtering

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_quiet_by_default() -> Result<()> {
  let ws = TestWorkspace::new("6.0.0")?;

  let output = run_release_bazel_ok(&ws, &["--verify-only"], "y\n")?;

  assert!(!stderr(&output).contains("DEBUG"));

  Ok(())
}

#[test]
fn test_rust_log_enables_debug_output() -> Result<()> {
  let ws = TestWorkspace::new("6.0.0")?;

  let output = run_release_bazel_with_env(&ws, &["--verify-only"], "y\n", &[("RUST_LOG", "debug")])?;

  assert!(output.status.success());
  let err = stderr(&output);
  assert!(err.contains("DEBUG"));
  assert!(err.contains("checking workspace marker"));

  Ok(())
}

#[test]
fn test_verbose_overrides_quieter_rust_log() -> Result<()> {
  let ws = TestWorkspace::new("6.0.0")?;

  let output = run_release_bazel_with_env(&ws, &["--verify-only", "-v"], "y\n", &[("RUST_LOG", "error")])?;

  assert!(output.status.success());
  assert!(stderr(&output).contains("checking workspace marker"));

  Ok(())
}
