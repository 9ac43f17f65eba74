//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub const UPDATE_SCRIPT: &str = "prebuilts/bazel/common/update.sh";
pub const VERIFICATION_SCRIPT: &str = "build/bazel/ci/bp2build.sh";
pub const PREBUILT_DIR: &str = "prebuilts/bazel/linux-x86_64";
pub const UPDATED_MARKER: &str = "prebuilts/bazel/common/updated_to";

/// A local stand-in for the upstream Bazel repository
pub struct UpstreamRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl UpstreamRepo {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    Ok(Self { _root: root, path })
  }

  /// Commit a change and return its SHA
  pub fn commit(&self, message: &str) -> Result<String> {
    std::fs::write(self.path.join("CHANGES"), message)?;
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }
}

/// An AOSP-shaped checkout with fake update and verification scripts
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
  /// TMPDIR for the binary, so scratch workspaces land somewhere inspectable
  pub tmp: PathBuf,
}

impl TestWorkspace {
  /// Create a workspace whose installed prebuilt is at `current_version`
  pub fn new(current_version: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("aosp");
    let tmp = root.path().join("tmp");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&tmp)?;

    let ws = Self { _root: root, path, tmp };

    ws.write_script(
      UPDATE_SCRIPT,
      &format!(
        "#!/bin/sh\necho \"updating to $1\"\necho \"update warning\" >&2\necho \"$1\" > {}\n",
        UPDATED_MARKER
      ),
    )?;
    ws.set_verification_exit(0)?;
    ws.add_prebuilt(current_version)?;

    Ok(ws)
  }

  /// Install another prebuilt binary
  pub fn add_prebuilt(&self, version: &str) -> Result<()> {
    let dir = self.path.join(PREBUILT_DIR);
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join(format!("bazel_nojdk-{}-linux-x86_64", version)), "")?;
    Ok(())
  }

  /// Make the fake verification build exit with `code`
  pub fn set_verification_exit(&self, code: i32) -> Result<()> {
    self.write_script(
      VERIFICATION_SCRIPT,
      &format!(
        "#!/bin/sh\necho \"variant=$TARGET_BUILD_VARIANT product=$TARGET_PRODUCT\"\necho \"home=$HOME\" >&2\nexit {}\n",
        code
      ),
    )
  }

  /// Point the ancestry check at a local upstream
  pub fn write_config(&self, upstream: &Path) -> Result<PathBuf> {
    let config = self.path.join("release.toml");
    std::fs::write(&config, format!("upstream_url = \"{}\"\n", upstream.display()))?;
    Ok(config)
  }

  fn write_script(&self, relative: &str, body: &str) -> Result<()> {
    let script = self.path.join(relative);
    std::fs::create_dir_all(script.parent().context("script has no parent")?)?;
    std::fs::write(&script, body)?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
  }

  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  /// The single scratch workspace a run created under `tmp`
  pub fn scratch_dir(&self) -> Result<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(&self.tmp)?
      .filter_map(|entry| entry.ok().map(|e| e.path()))
      .filter(|p| p.file_name().is_some_and(|n| n.to_string_lossy().starts_with("release-bazel-")))
      .collect();
    anyhow::ensure!(dirs.len() == 1, "expected one scratch workspace, found {}", dirs.len());
    Ok(dirs.remove(0))
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run release-bazel in `ws`, feeding `answers` on stdin. Does not check the exit status.
pub fn run_release_bazel(ws: &TestWorkspace, args: &[&str], answers: &str) -> Result<Output> {
  run_release_bazel_in(&ws.path, &ws.tmp, args, answers, &[])
}

/// Like `run_release_bazel`, with extra environment variables for the binary
pub fn run_release_bazel_with_env(
  ws: &TestWorkspace,
  args: &[&str],
  answers: &str,
  envs: &[(&str, &str)],
) -> Result<Output> {
  run_release_bazel_in(&ws.path, &ws.tmp, args, answers, envs)
}

pub fn run_release_bazel_in(
  cwd: &Path,
  tmp: &Path,
  args: &[&str],
  answers: &str,
  envs: &[(&str, &str)],
) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_release-bazel");

  let mut child = Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env("TMPDIR", tmp)
    .env_remove("RUST_LOG")
    .envs(envs.iter().copied())
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .context("Failed to run release-bazel")?;

  // The binary may exit before reading its input
  if let Some(mut stdin) = child.stdin.take() {
    let _ = stdin.write_all(answers.as_bytes());
  }

  Ok(child.wait_with_output()?)
}

/// Like `run_release_bazel`, but fail unless the run succeeded
pub fn run_release_bazel_ok(ws: &TestWorkspace, args: &[&str], answers: &str) -> Result<Output> {
  let output = run_release_bazel(ws, args, answers)?;

  if !output.status.success() {
    anyhow::bail!(
      "release-bazel failed: release-bazel {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
