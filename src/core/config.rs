use crate::core::error::{EnvironmentError, ReleaseError, ReleaseResult};
use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths, patterns and commands describing the checkout being released into.
///
/// Every field has a default matching an AOSP checkout, so a config file only
/// needs the keys it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReleaseConfig {
  /// Update script, relative to the workspace root. Also the workspace marker.
  pub update_script: PathBuf,

  /// Directory holding the checked-in prebuilt binary
  pub prebuilt_dir: PathBuf,

  /// Glob matching the prebuilt binary's file name
  pub prebuilt_glob: String,

  /// Regex extracting the version (capture group 1) from the file name
  pub prebuilt_version_regex: String,

  /// Upstream repository used for the ancestry check
  pub upstream_url: String,

  /// Name of the clone directory inside the scratch workspace
  pub clone_dir: String,

  /// Verification build entry point, relative to the workspace root
  pub verification_script: PathBuf,

  /// Fixed environment for the verification build (PATH is inherited on top)
  pub verification_env: BTreeMap<String, String>,

  /// Directories the update script may modify
  pub update_outputs: Vec<PathBuf>,
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      update_script: PathBuf::from("prebuilts/bazel/common/update.sh"),
      prebuilt_dir: PathBuf::from("prebuilts/bazel/linux-x86_64"),
      prebuilt_glob: "bazel_nojdk-*-linux-x86_64".to_string(),
      prebuilt_version_regex: "^bazel_nojdk-(.+)-linux-x86_64$".to_string(),
      upstream_url: "https://github.com/bazelbuild/bazel.git".to_string(),
      clone_dir: "bazel".to_string(),
      verification_script: PathBuf::from("build/bazel/ci/bp2build.sh"),
      verification_env: BTreeMap::from([
        ("TARGET_BUILD_VARIANT".to_string(), "userdebug".to_string()),
        ("TARGET_PRODUCT".to_string(), "aosp_arm64".to_string()),
      ]),
      update_outputs: vec![
        PathBuf::from("prebuilts/bazel/linux-x86_64"),
        PathBuf::from("prebuilts/bazel/darwin-x86_64"),
        PathBuf::from("prebuilts/bazel/common"),
      ],
    }
  }
}

impl ReleaseConfig {
  /// Load configuration from an optional TOML file, falling back to defaults
  pub fn load(path: Option<&Path>) -> ReleaseResult<Self> {
    let Some(path) = path else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: ReleaseConfig = toml_edit::de::from_str(&content).map_err(|e| {
      ReleaseError::Environment(EnvironmentError::InvalidConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })
    })?;

    config.validate().map_err(|e| {
      ReleaseError::Environment(EnvironmentError::InvalidConfig {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })
    })?;

    Ok(config)
  }

  /// Check the fields that can be wrong in ways serde can't see
  pub fn validate(&self) -> ReleaseResult<()> {
    glob::Pattern::new(&self.prebuilt_glob)?;
    self.version_regex()?;

    if self.clone_dir.is_empty() || self.clone_dir.contains('/') {
      return Err(ReleaseError::message(format!(
        "clone_dir '{}' must be a single directory name",
        self.clone_dir
      )));
    }

    Ok(())
  }

  /// Compile the version regex, requiring a capture group for the version
  pub fn version_regex(&self) -> ReleaseResult<Regex> {
    let regex = Regex::new(&self.prebuilt_version_regex)?;
    if regex.captures_len() < 2 {
      return Err(ReleaseError::message(format!(
        "prebuilt_version_regex '{}' has no capture group for the version",
        self.prebuilt_version_regex
      )));
    }
    Ok(regex)
  }
}
