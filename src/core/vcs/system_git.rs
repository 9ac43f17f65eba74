//! System git backend
//!
//! Every call goes through the `CommandExecutor` so the same code paths run
//! against a recording fake in tests. Commands use:
//! - an isolated environment (only PATH and HOME inherited)
//! - safe configuration overrides on the command line

use crate::core::error::{ReleaseResult, ToolError};
use crate::core::exec::{CommandExecutor, CommandSpec, inherit_env, path_arg};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Git operations on one local repository
pub struct SystemGit<'a> {
  executor: &'a dyn CommandExecutor,

  /// Repository working directory
  pub(crate) repo_path: PathBuf,
}

impl<'a> SystemGit<'a> {
  /// Wrap an existing repository
  pub fn open(executor: &'a dyn CommandExecutor, path: &Path) -> Self {
    Self {
      executor,
      repo_path: path.to_path_buf(),
    }
  }

  /// Clone `url` with full history into `dest`, logging git's output to `log`
  pub fn clone_repo(executor: &'a dyn CommandExecutor, url: &str, dest: &Path, log: &Path) -> ReleaseResult<Self> {
    let cwd = dest.parent().unwrap_or(dest);
    let spec = git_cmd(cwd, &["clone", url, &path_arg(dest)]);
    debug!(url, dest = %dest.display(), "cloning");

    let status = executor.run(&spec, log)?;
    if !status.success() {
      return Err(
        ToolError::CommandFailed {
          command: format!("git clone {}", url),
          code: status.code,
          log: Some(log.to_path_buf()),
          help: Some(format!(
            "Check network access to {} and see {} for git's output.",
            url,
            log.display()
          )),
        }
        .into(),
      );
    }

    Ok(Self::open(executor, dest))
  }

  /// Whether `ancestor` is reachable by walking back from `descendant`
  ///
  /// Uses `git merge-base --is-ancestor`: exit 0 means yes, 1 means no,
  /// anything else (unknown revision, corrupt repo) is an error. git's
  /// output goes to `log`.
  pub fn is_ancestor(&self, ancestor: &str, descendant: &str, log: &Path) -> ReleaseResult<bool> {
    let spec = git_cmd(&self.repo_path, &["merge-base", "--is-ancestor", ancestor, descendant]);
    let status = self.executor.run(&spec, log)?;

    match status.code {
      Some(0) => Ok(true),
      Some(1) => Ok(false),
      code => Err(
        ToolError::CommandFailed {
          command: format!("git merge-base --is-ancestor {} {}", ancestor, descendant),
          code,
          log: Some(log.to_path_buf()),
          help: Some(format!(
            "Check that both {} and {} exist in the upstream repository. See {} for git's output.",
            ancestor,
            descendant,
            log.display()
          )),
        }
        .into(),
      ),
    }
  }
}

/// Create a safe git command with isolated environment
///
/// - Runs in `cwd`
/// - Whitelists only PATH and HOME
/// - Adds safe configuration overrides
pub(crate) fn git_cmd(cwd: &Path, args: &[&str]) -> CommandSpec {
  let mut argv = vec![
    "git".to_string(),
    "-c".to_string(),
    "protocol.version=2".to_string(),
    "-c".to_string(),
    "advice.detachedHead=false".to_string(),
    "-c".to_string(),
    "core.quotePath=false".to_string(),
  ];
  argv.extend(args.iter().map(|arg| arg.to_string()));

  CommandSpec::new(argv, cwd).envs(inherit_env(&["PATH", "HOME"]))
}
