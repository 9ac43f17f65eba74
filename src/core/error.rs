//! Error types for release-bazel with contextual help messages
//!
//! Every fatal condition in a release run is one of four classes: the
//! environment is wrong, the operator declined a precondition, an external
//! tool failed, or the requested release violates policy. All of them are
//! reported the same way by `main`: print the diagnostic and exit with 1.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Process exit status for any fatal condition
pub const FATAL_EXIT_CODE: i32 = 1;

/// Main error type for release-bazel
#[derive(Debug)]
pub enum ReleaseError {
  /// Wrong invocation directory, missing or ambiguous prebuilt, bad input
  Environment(EnvironmentError),

  /// The operator answered a confirmation negatively
  Declined(DeclinedError),

  /// An external command could not be run or exited nonzero
  Tool(ToolError),

  /// The requested release is not allowed
  Policy(PolicyError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: ctx_str,
        context: Some(err.to_string()),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the process exit status for this error
  pub fn exit_code(&self) -> i32 {
    FATAL_EXIT_CODE
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Environment(e) => e.help_message(),
      ReleaseError::Declined(e) => e.help_message(),
      ReleaseError::Tool(e) => e.help_message(),
      ReleaseError::Policy(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      ReleaseError::Io(_) => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Environment(e) => write!(f, "{}", e),
      ReleaseError::Declined(e) => write!(f, "{}", e),
      ReleaseError::Tool(e) => write!(f, "{}", e),
      ReleaseError::Policy(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::Tool(ToolError::SpawnFailed { source, .. }) => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<EnvironmentError> for ReleaseError {
  fn from(err: EnvironmentError) -> Self {
    ReleaseError::Environment(err)
  }
}

impl From<DeclinedError> for ReleaseError {
  fn from(err: DeclinedError) -> Self {
    ReleaseError::Declined(err)
  }
}

impl From<ToolError> for ReleaseError {
  fn from(err: ToolError) -> Self {
    ReleaseError::Tool(err)
  }
}

impl From<PolicyError> for ReleaseError {
  fn from(err: PolicyError) -> Self {
    ReleaseError::Policy(err)
  }
}

impl From<glob::PatternError> for ReleaseError {
  fn from(err: glob::PatternError) -> Self {
    ReleaseError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<regex::Error> for ReleaseError {
  fn from(err: regex::Error) -> Self {
    ReleaseError::message(format!("Invalid regex: {}", err))
  }
}

/// Problems with the checkout or the invocation itself
#[derive(Debug)]
pub enum EnvironmentError {
  /// The update script is not where it should be relative to the cwd
  MissingWorkspaceMarker { path: PathBuf },

  /// No prebuilt binary matched the naming pattern
  NoPrebuilt { dir: PathBuf, pattern: String },

  /// More than one prebuilt binary matched the naming pattern
  AmbiguousPrebuilt { matches: Vec<PathBuf> },

  /// A prebuilt matched the glob but its name carries no version
  UnparseablePrebuilt { path: PathBuf },

  /// `--commit` is required for a full release
  MissingCommit,

  /// The operator input stream ended before a valid answer
  InputClosed { question: String },

  /// The configuration file is unreadable or invalid
  InvalidConfig { path: PathBuf, reason: String },
}

impl EnvironmentError {
  fn help_message(&self) -> Option<String> {
    match self {
      EnvironmentError::MissingWorkspaceMarker { .. } => {
        Some("Run release-bazel from the root of your AOSP checkout.".to_string())
      }
      EnvironmentError::NoPrebuilt { .. } => Some(
        "Check that your workspace is clean and synced to HEAD, then re-run.".to_string(),
      ),
      EnvironmentError::AmbiguousPrebuilt { .. } => Some(
        "Clean the workspace so exactly one prebuilt Bazel binary remains, then re-run.".to_string(),
      ),
      EnvironmentError::MissingCommit => Some(
        "Pass --commit <hash>, or --verify-only to resume at the verification step.".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for EnvironmentError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EnvironmentError::MissingWorkspaceMarker { path } => {
        write!(
          f,
          "Not at the root of an AOSP checkout.\nExpected file: {}",
          path.display()
        )
      }
      EnvironmentError::NoPrebuilt { dir, pattern } => {
        write!(
          f,
          "No prebuilt Bazel binary matching '{}' found in {}",
          pattern,
          dir.display()
        )
      }
      EnvironmentError::AmbiguousPrebuilt { matches } => {
        write!(f, "Found {} prebuilt Bazel binaries, expected exactly one:", matches.len())?;
        for path in matches {
          write!(f, "\n  {}", path.display())?;
        }
        Ok(())
      }
      EnvironmentError::UnparseablePrebuilt { path } => {
        write!(f, "Could not extract a version from prebuilt {}", path.display())
      }
      EnvironmentError::MissingCommit => write!(f, "Must specify a value for --commit"),
      EnvironmentError::InputClosed { question } => {
        write!(f, "Input closed before answering: {}", question)
      }
      EnvironmentError::InvalidConfig { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
    }
  }
}

/// The operator answered "n" to a confirmation
#[derive(Debug)]
pub struct DeclinedError {
  pub question: String,
  pub guidance: String,
}

impl DeclinedError {
  pub fn new(question: impl Into<String>, guidance: impl Into<String>) -> Self {
    Self {
      question: question.into(),
      guidance: guidance.into(),
    }
  }

  fn help_message(&self) -> Option<String> {
    Some(self.guidance.clone())
  }
}

impl fmt::Display for DeclinedError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Declined: {}", self.question)
  }
}

/// External command failures
#[derive(Debug)]
pub enum ToolError {
  /// The command could not be started at all
  SpawnFailed { command: String, source: io::Error },

  /// The command ran and exited unsuccessfully
  CommandFailed {
    command: String,
    code: Option<i32>,
    log: Option<PathBuf>,
    help: Option<String>,
  },
}

impl ToolError {
  fn help_message(&self) -> Option<String> {
    match self {
      ToolError::SpawnFailed { .. } => Some("Check that the command exists and is executable.".to_string()),
      ToolError::CommandFailed { help, log, .. } => match (help, log) {
        (Some(help), _) => Some(help.clone()),
        (None, Some(log)) => Some(format!("See {} for the full output.", log.display())),
        (None, None) => None,
      },
    }
  }
}

impl fmt::Display for ToolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolError::SpawnFailed { command, source } => {
        write!(f, "Failed to execute `{}`: {}", command, source)
      }
      ToolError::CommandFailed { command, code, log, .. } => {
        match code {
          Some(code) => write!(f, "`{}` failed with exit code {}", command, code)?,
          None => write!(f, "`{}` was terminated by a signal", command)?,
        }
        if let Some(log) = log {
          write!(f, "\nLog file: {}", log.display())?;
        }
        Ok(())
      }
    }
  }
}

/// Release policy violations
#[derive(Debug)]
pub enum PolicyError {
  /// The target commit is the one already checked in
  AlreadyCurrent { version: String },

  /// The current commit is not an ancestor of the target commit
  NotNewer { current: String, target: String },
}

impl PolicyError {
  fn help_message(&self) -> Option<String> {
    match self {
      PolicyError::AlreadyCurrent { .. } => Some(
        "No new release is needed. Use --verify-only to re-run verification of the current prebuilt.".to_string(),
      ),
      PolicyError::NotNewer { .. } => Some(
        "You may be targeting an older commit. Pass --force to skip the ancestry check if this is intended."
          .to_string(),
      ),
    }
  }
}

impl fmt::Display for PolicyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PolicyError::AlreadyCurrent { version } => {
        write!(f, "Commit {} is already the current prebuilt Bazel commit", version)
      }
      PolicyError::NotNewer { current, target } => {
        write!(
          f,
          "Commit {} is not newer than the current Bazel commit {}",
          target, current
        )
      }
    }
  }
}

/// Result type alias for release-bazel
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for ReleaseError {
  fn from(err: anyhow::Error) -> Self {
    ReleaseError::message(format!("{:#}", err))
  }
}
