//! Yes/no confirmations for the human-paced parts of a release

use crate::core::error::{EnvironmentError, ReleaseResult};
use std::io::{BufRead, Write};

/// Anything that can ask the operator a yes/no question
pub trait Confirm {
  /// Ask until the answer is exactly "y" or "n"
  fn ask(&mut self, question: &str) -> ReleaseResult<bool>;
}

/// Line-based prompter over any input source and output sink
pub struct Prompter<R, W> {
  input: R,
  output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
  pub fn new(input: R, output: W) -> Self {
    Self { input, output }
  }

  /// Consume the prompter, returning its output sink
  #[cfg(test)]
  pub fn into_output(self) -> W {
    self.output
  }
}

impl<R: BufRead, W: Write> Confirm for Prompter<R, W> {
  fn ask(&mut self, question: &str) -> ReleaseResult<bool> {
    loop {
      write!(self.output, "{} (y/n): ", question)?;
      self.output.flush()?;

      let mut line = String::new();
      if self.input.read_line(&mut line)? == 0 {
        writeln!(self.output)?;
        return Err(
          EnvironmentError::InputClosed {
            question: question.to_string(),
          }
          .into(),
        );
      }

      let response = line.strip_suffix('\n').unwrap_or(&line);
      let response = response.strip_suffix('\r').unwrap_or(response);

      match response {
        "y" => {
          writeln!(self.output)?;
          return Ok(true);
        }
        "n" => {
          writeln!(self.output)?;
          return Ok(false);
        }
        other => writeln!(self.output, "'{}' invalid, please specify y or n.", other)?,
      }
    }
  }
}
