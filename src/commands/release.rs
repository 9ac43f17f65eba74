//! The release checklist
//!
//! Walks the release manager through every step required to cut a new
//! prebuilt Bazel for AOSP, in a fixed order:
//!
//! 1. Verify the workspace root
//! 2. Resolve the current prebuilt version        (skipped by --verify-only)
//! 3. Check the target is newer upstream          (skipped by --verify-only or --force)
//! 4. Confirm local projects are clean and synced (skipped by --verify-only)
//! 5. Run the update script                       (skipped by --verify-only)
//! 6. Run the verification build
//! 7. Confirm CLs were created
//!
//! Each step assumes the side effects of the ones before it. The first
//! failure aborts the run; nothing is retried or rolled back. Re-running,
//! optionally with --verify-only, is the recovery path.

use crate::core::ancestry::{ensure_newer, ensure_not_current};
use crate::core::config::ReleaseConfig;
use crate::core::context::ReleaseContext;
use crate::core::error::{DeclinedError, EnvironmentError, ReleaseError, ReleaseResult};
use crate::core::exec::{CommandExecutor, CommandSpec, SystemExecutor, inherit_env, path_arg};
use crate::core::prompt::{Confirm, Prompter};
use crate::core::runner::{ExternalStep, run_external};
use crate::core::version::resolve_current_version;
use crate::core::workspace::verify_workspace_root;
use std::env;
use std::fmt;
use std::path::Path;
use tracing::debug;

pub const UPDATE_LOG: &str = "update.log";
pub const VERIFICATION_LOG: &str = "verification.log";

const CLEAN_WORKSPACE_QUESTION: &str =
  "Are all relevant local projects in your working directory clean (fresh branches) and synced to HEAD?";
const CLEAN_WORKSPACE_GUIDANCE: &str = "Please ready your local projects before continuing with the release script";
const COMMITS_CREATED_QUESTION: &str = "Have you created CLs for all projects that need to be updated?";
const COMMITS_CREATED_GUIDANCE: &str =
  "Create CLs for all projects. After approval and CL submission, the release is complete.";
const VERIFICATION_GUIDANCE: &str = "Please remedy all issues until verification runs successfully.\n\
   You may skip to the verify step in this script by using --verify-only";
const DONE_MESSAGE: &str =
  "Bazel release verified and CLs sent for approval. After approval and CL submission, the release is complete.";

/// What the operator asked for. Built once from the command line.
#[derive(Debug, Clone, Default)]
pub struct ReleaseRequest {
  target: Option<String>,
  pub force: bool,
  pub verify_only: bool,
  pub dry_run: bool,
}

impl ReleaseRequest {
  /// A target commit is required unless only verifying
  pub fn new(target: Option<String>, force: bool, verify_only: bool, dry_run: bool) -> ReleaseResult<Self> {
    if target.is_none() && !verify_only {
      return Err(EnvironmentError::MissingCommit.into());
    }
    Ok(Self {
      target,
      force,
      verify_only,
      dry_run,
    })
  }

  pub fn target(&self) -> ReleaseResult<&str> {
    self.target.as_deref().ok_or_else(|| EnvironmentError::MissingCommit.into())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
  VerifyWorkspace,
  ResolveVersion,
  CheckAncestry,
  ConfirmCleanWorkspace,
  RunUpdate,
  RunVerification,
  ConfirmCommitsCreated,
}

impl Step {
  pub const ALL: [Step; 7] = [
    Step::VerifyWorkspace,
    Step::ResolveVersion,
    Step::CheckAncestry,
    Step::ConfirmCleanWorkspace,
    Step::RunUpdate,
    Step::RunVerification,
    Step::ConfirmCommitsCreated,
  ];

  /// Which flag, if any, skips this step for `request`
  pub fn skipped_by(self, request: &ReleaseRequest) -> Option<&'static str> {
    match self {
      Step::ResolveVersion | Step::ConfirmCleanWorkspace | Step::RunUpdate if request.verify_only => {
        Some("--verify-only")
      }
      Step::CheckAncestry if request.verify_only => Some("--verify-only"),
      Step::CheckAncestry if request.force => Some("--force"),
      _ => None,
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Step::VerifyWorkspace => "Verify workspace root",
      Step::ResolveVersion => "Resolve current Bazel version",
      Step::CheckAncestry => "Check target commit is newer",
      Step::ConfirmCleanWorkspace => "Confirm local projects are clean",
      Step::RunUpdate => "Run update script",
      Step::RunVerification => "Run verification build",
      Step::ConfirmCommitsCreated => "Confirm CLs are created",
    };
    f.write_str(label)
  }
}

#[derive(Debug)]
pub enum StepOutcome {
  Completed,
  Skipped,
  Aborted(ReleaseError),
}

/// Ordered record of what happened to each step that was reached
#[derive(Debug, Default)]
pub struct ReleaseReport {
  pub steps: Vec<(Step, StepOutcome)>,
}

impl ReleaseReport {
  #[cfg(test)]
  pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
    self.steps.iter().find(|(s, _)| *s == step).map(|(_, outcome)| outcome)
  }

  #[cfg(test)]
  pub fn completed(&self, step: Step) -> bool {
    matches!(self.outcome(step), Some(StepOutcome::Completed))
  }

  #[cfg(test)]
  pub fn skipped(&self, step: Step) -> bool {
    matches!(self.outcome(step), Some(StepOutcome::Skipped))
  }

  /// The error that aborted the run, if any
  pub fn into_result(self) -> ReleaseResult<()> {
    for (_, outcome) in self.steps {
      if let StepOutcome::Aborted(err) = outcome {
        return Err(err);
      }
    }
    Ok(())
  }
}

/// Run the release command
pub fn run_release(
  commit: Option<String>,
  force: bool,
  verify_only: bool,
  dry_run: bool,
  config_path: Option<&Path>,
) -> ReleaseResult<()> {
  let request = ReleaseRequest::new(commit, force, verify_only, dry_run)?;
  let config = ReleaseConfig::load(config_path)?;
  let mut ctx = ReleaseContext::new(env::current_dir()?, config, request.dry_run);

  let stdin = std::io::stdin();
  let mut prompter = Prompter::new(stdin.lock(), std::io::stdout());

  execute(&mut ctx, &SystemExecutor, &mut prompter, &request).into_result()
}

/// Drive every step in order, stopping at the first abort
pub fn execute(
  ctx: &mut ReleaseContext,
  executor: &dyn CommandExecutor,
  prompter: &mut dyn Confirm,
  request: &ReleaseRequest,
) -> ReleaseReport {
  let mut report = ReleaseReport::default();
  let mut current_version: Option<String> = None;

  if request.dry_run {
    println!("🔍 Dry-run mode (external steps are printed, not executed)");
    println!();
  }

  for (index, step) in Step::ALL.into_iter().enumerate() {
    if let Some(flag) = step.skipped_by(request) {
      debug!(%step, flag, "skipping step");
      println!("⏭  [{}/{}] {} (skipped: {})", index + 1, Step::ALL.len(), step, flag);
      report.steps.push((step, StepOutcome::Skipped));
      continue;
    }

    println!("▶ [{}/{}] {}", index + 1, Step::ALL.len(), step);
    let result = run_step(step, ctx, executor, prompter, request, &mut current_version);

    match result {
      Ok(()) => report.steps.push((step, StepOutcome::Completed)),
      Err(err) => {
        debug!(%step, error = %err, "step aborted");
        if let Some(scratch) = ctx.scratch_path() {
          println!("📁 Logs kept in {}", scratch.display());
        }
        report.steps.push((step, StepOutcome::Aborted(err)));
        return report;
      }
    }
  }

  println!();
  println!("✅ {}", DONE_MESSAGE);
  report
}

fn run_step(
  step: Step,
  ctx: &mut ReleaseContext,
  executor: &dyn CommandExecutor,
  prompter: &mut dyn Confirm,
  request: &ReleaseRequest,
  current_version: &mut Option<String>,
) -> ReleaseResult<()> {
  match step {
    Step::VerifyWorkspace => verify_workspace_root(&ctx.root, &ctx.config),

    Step::ResolveVersion => {
      let version = resolve_current_version(&ctx.root, &ctx.config)?;
      println!("   Current prebuilt Bazel: {}", version);
      if request.force {
        ensure_not_current(&version, request.target()?)?;
      }
      *current_version = Some(version);
      Ok(())
    }

    Step::CheckAncestry => {
      let target = request.target()?;
      let current = match current_version {
        Some(version) => version.clone(),
        None => resolve_current_version(&ctx.root, &ctx.config)?,
      };
      ensure_newer(ctx, executor, &current, target)?;
      println!("   {} is newer than {}", target, current);
      Ok(())
    }

    Step::ConfirmCleanWorkspace => confirm(prompter, CLEAN_WORKSPACE_QUESTION, CLEAN_WORKSPACE_GUIDANCE),

    Step::RunUpdate => {
      let step = update_step(ctx, request.target()?);
      run_external(ctx, executor, &step)?;
      if !ctx.dry_run {
        println!("   Update finished. These directories may have been modified:");
        for dir in &ctx.config.update_outputs {
          println!("     {}", dir.display());
        }
      }
      Ok(())
    }

    Step::RunVerification => {
      let step = verification_step(ctx);
      run_external(ctx, executor, &step)
    }

    Step::ConfirmCommitsCreated => {
      println!("   Create CLs for all projects that need to be updated.");
      confirm(prompter, COMMITS_CREATED_QUESTION, COMMITS_CREATED_GUIDANCE)
    }
  }
}

fn confirm(prompter: &mut dyn Confirm, question: &str, guidance: &str) -> ReleaseResult<()> {
  if prompter.ask(question)? {
    Ok(())
  } else {
    Err(DeclinedError::new(question, guidance).into())
  }
}

/// `<update_script> <commit>` from the workspace root
fn update_step(ctx: &ReleaseContext, target: &str) -> ExternalStep {
  let script = ctx.workspace_path(&ctx.config.update_script);
  let command = CommandSpec::new([path_arg(&script), target.to_string()], &ctx.root).envs(inherit_env(&["PATH", "HOME"]));
  ExternalStep::new(command, UPDATE_LOG)
}

/// Verification build with its fixed environment plus the caller's PATH
fn verification_step(ctx: &ReleaseContext) -> ExternalStep {
  let script = ctx.workspace_path(&ctx.config.verification_script);
  let command = CommandSpec::new([path_arg(&script)], &ctx.root)
    .envs(ctx.config.verification_env.clone())
    .envs(inherit_env(&["PATH"]));
  ExternalStep::new(command, VERIFICATION_LOG).on_failure(VERIFICATION_GUIDANCE)
}
