//! Instruction buffer
//!
//! Lets a caller build a multi-line MADX script incrementally before
//! handing it to a runner. Lines are stored verbatim; no validation.

use crate::error::MadxError;
use crate::output::ExecutionResult;
use crate::runner::Runner;

/// An ordered accumulator of MADX instruction lines.
#[derive(Debug, Clone, Default)]
pub struct Script {
    lines: Vec<String>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one instruction line
    pub fn append(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Reset the buffer to empty
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The accumulated script as a single newline-joined string
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Execute the accumulated script through the full pipeline
    pub fn execute(&self, runner: &Runner) -> Result<ExecutionResult, MadxError> {
        runner.execute(&self.text())
    }

    /// Execute and return the output file's lines verbatim
    pub fn execute_raw(&self, runner: &Runner) -> Result<ExecutionResult, MadxError> {
        runner.execute_raw(&self.text())
    }
}

impl<S: Into<String>> FromIterator<S> for Script {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}
