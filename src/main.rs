mod commands;
mod core;

use clap::Parser;
use crate::core::error::{ReleaseError, print_error};
use std::path::PathBuf;

/// Walks the user through all steps required to cut a new Bazel binary (and
/// related artifacts) for AOSP. Intended for use only by the current Bazel
/// release manager.
#[derive(Parser)]
#[command(name = "release-bazel")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// The Bazel commit hash to release (required unless --verify-only)
  #[arg(long, value_name = "HASH")]
  commit: Option<String>,

  /// Skip the check that the commit is newer than the current prebuilt
  #[arg(short, long)]
  force: bool,

  /// Only run verification and the CL reminder (resume a partial release)
  #[arg(long)]
  verify_only: bool,

  /// Print external commands instead of executing them
  #[arg(long)]
  dry_run: bool,

  /// TOML file overriding the built-in workspace layout
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  // RUST_LOG wins over the default; --verbose wins over both
  let mut filter = tracing_subscriber::EnvFilter::builder()
    .with_default_directive(tracing::Level::WARN.into())
    .from_env_lossy();
  if cli.verbose {
    filter = filter.add_directive(tracing::Level::DEBUG.into());
  }

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();

  let result = commands::run_release(
    cli.commit,
    cli.force,
    cli.verify_only,
    cli.dry_run,
    cli.config.as_deref(),
  );

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code());
}
