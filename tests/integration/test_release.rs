//! Integration tests for complete release runs

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_full_release() -> Result<()> {
  let upstream = UpstreamRepo::new()?;
  let current = upstream.commit("Bazel 6.0.0")?;
  let target = upstream.commit("Bazel 6.1.0")?;

  let ws = TestWorkspace::new(&current)?;
  let config = ws.write_config(&upstream.path)?;

  let output = run_release_bazel_ok(
    &ws,
    &["--commit", &target, "--config", config.to_str().unwrap()],
    "y\ny\n",
  )?;
  let out = stdout(&output);

  assert!(out.contains(&format!("Current prebuilt Bazel: {}", current)));
  assert!(out.contains("Update finished. These directories may have been modified:"));
  assert!(out.contains("prebuilts/bazel/darwin-x86_64"));
  assert!(out.contains("Bazel release verified and CLs sent for approval."));
  assert_eq!(ws.read_file(UPDATED_MARKER)?.trim(), target);

  // One scratch workspace holds the clone and every log
  let scratch = ws.scratch_dir()?;
  assert!(scratch.join("bazel/.git").is_dir());
  assert!(scratch.join("clone.log").is_file());

  let update_log = std::fs::read_to_string(scratch.join("update.log"))?;
  assert!(update_log.contains(&format!("updating to {}", target)));
  assert!(update_log.contains("update warning"));

  let verification_log = std::fs::read_to_string(scratch.join("verification.log"))?;
  assert!(verification_log.contains("variant=userdebug product=aosp_arm64"));
  assert!(verification_log.contains("home=\n"));

  Ok(())
}

#[test]
fn test_force_allows_older_commit() -> Result<()> {
  let upstream = UpstreamRepo::new()?;
  let older = upstream.commit("Bazel 5.0.0")?;
  let current = upstream.commit("Bazel 6.0.0")?;

  let ws = TestWorkspace::new(&current)?;
  let config = ws.write_config(&upstream.path)?;

  run_release_bazel_ok(
    &ws,
    &["--commit", &older, "-f", "--config", config.to_str().unwrap()],
    "y\ny\n",
  )?;

  assert_eq!(ws.read_file(UPDATED_MARKER)?.trim(), older);
  assert!(!ws.scratch_dir()?.join("bazel").exists());

  Ok(())
}

#[test]
fn test_verify_only_resumes_at_verification() -> Result<()> {
  let ws = TestWorkspace::new("6.0.0")?;
  // A half-finished update can leave two prebuilts behind; verify-only must not care
  ws.add_prebuilt("6.1.0")?;

  let output = run_release_bazel_ok(&ws, &["--verify-only"], "y\n")?;
  let out = stdout(&output);

  assert!(out.contains("(skipped: --verify-only)"));
  assert!(out.contains("Have you created CLs for all projects that need to be updated? (y/n): "));
  assert!(!out.contains("clean (fresh branches)"));
  assert!(!ws.file_exists(UPDATED_MARKER));

  Ok(())
}

#[test]
fn test_invalid_answers_are_reprompted() -> Result<()> {
  let ws = TestWorkspace::new("6.0.0")?;

  let output = run_release_bazel_ok(&ws, &["--verify-only"], "yes\nY\ny\n")?;
  let out = stdout(&output);

  assert!(out.contains("'yes' invalid, please specify y or n."));
  assert!(out.contains("'Y' invalid, please specify y or n."));
  assert_eq!(out.matches("(y/n): ").count(), 3);

  Ok(())
}
