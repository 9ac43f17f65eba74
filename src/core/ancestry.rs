//! Guard against releasing an older Bazel over a newer one.
//!
//! Ancestry is checked against a fresh clone of upstream rather than any
//! local checkout, so the answer reflects the authoritative history.

use crate::core::context::ReleaseContext;
use crate::core::error::{PolicyError, ReleaseResult};
use crate::core::exec::CommandExecutor;
use crate::core::vcs::SystemGit;
use tracing::debug;

pub const CLONE_LOG: &str = "clone.log";
pub const MERGE_BASE_LOG: &str = "merge-base.log";

/// Fail if `target` is the revision already checked in.
///
/// `--force` skips the ancestry check but never this one.
pub fn ensure_not_current(current: &str, target: &str) -> ReleaseResult<()> {
  if current == target {
    return Err(
      PolicyError::AlreadyCurrent {
        version: target.to_string(),
      }
      .into(),
    );
  }
  Ok(())
}

/// Fail unless `target` is strictly newer than `current` in upstream history.
///
/// Equal revisions are rejected before anything is cloned. This runs in
/// dry-run mode too; it only writes into the scratch workspace.
pub fn ensure_newer(
  ctx: &mut ReleaseContext,
  executor: &dyn CommandExecutor,
  current: &str,
  target: &str,
) -> ReleaseResult<()> {
  ensure_not_current(current, target)?;

  let scratch = ctx.scratch_dir()?;
  let dest = scratch.join(&ctx.config.clone_dir);
  let log = scratch.join(CLONE_LOG);

  println!("   Cloning {} ...", ctx.config.upstream_url);
  let git = SystemGit::clone_repo(executor, &ctx.config.upstream_url, &dest, &log)?;

  let newer = git.is_ancestor(current, target, &scratch.join(MERGE_BASE_LOG))?;
  debug!(current, target, newer, "ancestry check");
  if !newer {
    return Err(
      PolicyError::NotNewer {
        current: current.to_string(),
        target: target.to_string(),
      }
      .into(),
    );
  }

  Ok(())
}
