//! Subprocess execution behind a trait so steps can be tested without
//! spawning real binaries.
//!
//! Every command runs with a cleared environment plus exactly the variables
//! listed on its `CommandSpec`. Callers that want an inherited variable
//! (PATH, HOME) copy it in explicitly with [`inherit_env`].

use crate::core::error::{ReleaseResult, ResultExt, ToolError};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// A fully described external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
  /// Program followed by its arguments
  pub argv: Vec<String>,
  pub cwd: PathBuf,
  pub env: BTreeMap<String, String>,
}

impl CommandSpec {
  pub fn new<I, S>(argv: I, cwd: impl Into<PathBuf>) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      argv: argv.into_iter().map(Into::into).collect(),
      cwd: cwd.into(),
      env: BTreeMap::new(),
    }
  }

  #[cfg(test)]
  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn envs(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
    self.env.extend(vars);
    self
  }

  pub fn program(&self) -> &str {
    self.argv.first().map(String::as_str).unwrap_or_default()
  }

  /// Shell-quoted command line, without environment
  pub fn command_line(&self) -> String {
    shell_words::join(&self.argv)
  }

  /// Shell-quoted command line prefixed with its environment assignments
  pub fn display_with_env(&self) -> String {
    let mut parts: Vec<String> = self
      .env
      .iter()
      .map(|(key, value)| format!("{}={}", key, shell_words::quote(value)))
      .collect();
    parts.push(self.command_line());
    parts.join(" ")
  }
}

/// Outcome of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
  /// Exit code, None if killed by a signal
  pub code: Option<i32>,
}

impl CommandStatus {
  #[cfg(test)]
  pub const SUCCESS: CommandStatus = CommandStatus { code: Some(0) };

  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Capability to run external commands to completion
pub trait CommandExecutor {
  /// Run `spec` to completion with stdout and stderr interleaved into `log`
  /// (created or truncated)
  fn run(&self, spec: &CommandSpec, log: &Path) -> ReleaseResult<CommandStatus>;
}

/// Runs commands as real subprocesses
pub struct SystemExecutor;

impl CommandExecutor for SystemExecutor {
  fn run(&self, spec: &CommandSpec, log: &Path) -> ReleaseResult<CommandStatus> {
    let stdout = File::create(log).with_context(|| format!("Failed to create log file {}", log.display()))?;
    let stderr = stdout.try_clone().context("Failed to duplicate log file handle")?;

    debug!(command = %spec.display_with_env(), cwd = %spec.cwd.display(), log = %log.display(), "spawning");

    let mut cmd = Command::new(spec.program());
    cmd
      .args(spec.argv.iter().skip(1))
      .current_dir(&spec.cwd)
      .env_clear()
      .envs(&spec.env)
      .stdin(Stdio::null())
      .stdout(stdout)
      .stderr(stderr);

    let status = cmd.status().map_err(|source| ToolError::SpawnFailed {
      command: spec.command_line(),
      source,
    })?;

    debug!(code = ?status.code(), "finished");
    Ok(CommandStatus { code: status.code() })
  }
}

/// Copy the named variables from this process's environment, skipping unset ones
pub fn inherit_env(names: &[&str]) -> BTreeMap<String, String> {
  names
    .iter()
    .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_string(), value)))
    .collect()
}

/// Render a path for use as a command argument
pub fn path_arg(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}
