use crate::core::config::ReleaseConfig;
use crate::core::error::{EnvironmentError, ReleaseResult, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Determine the version of the checked-in prebuilt Bazel binary.
///
/// Exactly one file in the prebuilt directory may match the naming pattern;
/// zero or several matches mean the checkout is not in a state to release from.
pub fn resolve_current_version(root: &Path, config: &ReleaseConfig) -> ReleaseResult<String> {
  let dir = root.join(&config.prebuilt_dir);
  let pattern = glob::Pattern::new(&config.prebuilt_glob)?;
  let regex = config.version_regex()?;

  let mut matches: Vec<PathBuf> = Vec::new();
  if dir.is_dir() {
    for entry in fs::read_dir(&dir).with_context(|| format!("Failed to read {}", dir.display()))? {
      let entry = entry?;
      if pattern.matches(&entry.file_name().to_string_lossy()) {
        matches.push(entry.path());
      }
    }
  }
  matches.sort();
  debug!(dir = %dir.display(), count = matches.len(), "scanned for prebuilt");

  let path = match matches.len() {
    0 => {
      return Err(
        EnvironmentError::NoPrebuilt {
          dir,
          pattern: config.prebuilt_glob.clone(),
        }
        .into(),
      );
    }
    1 => matches.remove(0),
    _ => return Err(EnvironmentError::AmbiguousPrebuilt { matches }.into()),
  };

  let version = path
    .file_name()
    .and_then(|name| name.to_str())
    .and_then(|name| regex.captures(name))
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str().to_string())
    .filter(|version| !version.is_empty());

  match version {
    Some(version) => Ok(version),
    None => Err(EnvironmentError::UnparseablePrebuilt { path }.into()),
  }
}
