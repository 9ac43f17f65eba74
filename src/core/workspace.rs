use crate::core::config::ReleaseConfig;
use crate::core::error::{EnvironmentError, ReleaseResult};
use std::path::Path;
use tracing::debug;

/// Check that `root` is the top of an AOSP checkout.
///
/// The update script doubles as the marker file; every other relative path
/// the release uses is only meaningful once this passes.
pub fn verify_workspace_root(root: &Path, config: &ReleaseConfig) -> ReleaseResult<()> {
  let marker = root.join(&config.update_script);
  debug!(marker = %marker.display(), "checking workspace marker");

  if !marker.is_file() {
    return Err(EnvironmentError::MissingWorkspaceMarker { path: marker }.into());
  }
  Ok(())
}
