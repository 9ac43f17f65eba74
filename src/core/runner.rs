//! Run an opaque external release step with its output captured to a log

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, ToolError};
use crate::core::exec::{CommandExecutor, CommandSpec};
use tracing::debug;

/// One external command plus the name of the log that captures it
#[derive(Debug, Clone)]
pub struct ExternalStep {
  pub command: CommandSpec,
  pub log_name: String,
  /// Extra help shown when the command fails, after the log location
  pub on_failure: Option<String>,
}

impl ExternalStep {
  pub fn new(command: CommandSpec, log_name: impl Into<String>) -> Self {
    Self {
      command,
      log_name: log_name.into(),
      on_failure: None,
    }
  }

  pub fn on_failure(mut self, help: impl Into<String>) -> Self {
    self.on_failure = Some(help.into());
    self
  }
}

/// Execute `step`, or describe it when the context is in dry-run mode.
///
/// Stdout and stderr both go to `<scratch>/<log_name>`. A nonzero exit is a
/// fatal error naming that log.
pub fn run_external(ctx: &mut ReleaseContext, executor: &dyn CommandExecutor, step: &ExternalStep) -> ReleaseResult<()> {
  if ctx.dry_run {
    println!("🔍 DRY RUN: Would execute:");
    println!("  {}", step.command.display_with_env());
    println!("  in {}", step.command.cwd.display());
    return Ok(());
  }

  let log = ctx.log_path(&step.log_name)?;
  println!("   Running {} (log: {})", step.command.command_line(), log.display());

  let status = executor.run(&step.command, &log)?;
  debug!(log = %log.display(), code = ?status.code, "external step finished");

  if !status.success() {
    let mut help = format!("See {} for the full output.", log.display());
    if let Some(extra) = &step.on_failure {
      help.push('\n');
      help.push_str(extra);
    }
    return Err(
      ToolError::CommandFailed {
        command: step.command.command_line(),
        code: status.code,
        log: Some(log),
        help: Some(help),
      }
      .into(),
    );
  }

  Ok(())
}
