//! Release context - built once in main, passed to every step
//!
//! Holds everything a step may need besides the operator and the command
//! executor: the workspace root every relative path resolves against, the
//! configuration, the dry-run flag, and the scratch workspace.
//!
//! The scratch workspace is created on first use and reused for every clone
//! and log file of the run, and is left on disk when the process
//! exits so the operator can inspect the logs.

use crate::core::config::ReleaseConfig;
use crate::core::error::{ReleaseResult, ResultExt};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ReleaseContext {
  /// Workspace root (the AOSP checkout)
  pub root: PathBuf,

  pub config: ReleaseConfig,

  /// Describe external side effects instead of performing them
  pub dry_run: bool,

  /// Parent directory for the scratch workspace (system temp dir if None)
  scratch_parent: Option<PathBuf>,

  scratch: Option<PathBuf>,
}

impl ReleaseContext {
  pub fn new(root: impl Into<PathBuf>, config: ReleaseConfig, dry_run: bool) -> Self {
    Self {
      root: root.into(),
      config,
      dry_run,
      scratch_parent: None,
      scratch: None,
    }
  }

  /// Create scratch workspaces under `parent` instead of the system temp dir
  #[cfg(test)]
  pub fn with_scratch_parent(mut self, parent: impl Into<PathBuf>) -> Self {
    self.scratch_parent = Some(parent.into());
    self
  }

  /// Resolve a workspace-relative path
  pub fn workspace_path(&self, relative: &Path) -> PathBuf {
    self.root.join(relative)
  }

  /// Scratch workspace path, if it has been created yet
  pub fn scratch_path(&self) -> Option<&Path> {
    self.scratch.as_deref()
  }

  /// Get the scratch workspace, creating it on first call
  pub fn scratch_dir(&mut self) -> ReleaseResult<PathBuf> {
    if let Some(dir) = &self.scratch {
      return Ok(dir.clone());
    }

    let mut builder = tempfile::Builder::new();
    builder.prefix("release-bazel-");
    let temp = match &self.scratch_parent {
      Some(parent) => builder.tempdir_in(parent),
      None => builder.tempdir(),
    }
    .context("Failed to create scratch workspace")?;

    let dir = temp.keep();
    debug!(path = %dir.display(), "created scratch workspace");
    println!("📁 Scratch workspace: {}", dir.display());

    self.scratch = Some(dir.clone());
    Ok(dir)
  }

  /// Path for a named log file inside the scratch workspace
  pub fn log_path(&mut self, log_name: &str) -> ReleaseResult<PathBuf> {
    Ok(self.scratch_dir()?.join(log_name))
  }
}
