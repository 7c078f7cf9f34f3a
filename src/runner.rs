//! Process runner
//!
//! Orchestrates one MADX execution: create a private temp directory,
//! rewrite the script to redirect output there, spawn the binary with the
//! script on stdin, capture console text, parse the output file, and let
//! the temp directory guard clean up.
//!
//! One child process per call — no pooling, no pipelining, and no
//! timeout: a hung child blocks the caller.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::binary;
use crate::error::MadxError;
use crate::output::{logf, ExecutionResult};
use crate::parser;
use crate::rewrite::redirect_output;

/// File name for the redirected output inside the per-call temp directory
const OUTPUT_FILE: &str = "madx-output.dat";

/// Runs MADX scripts through the full rewrite/execute/parse pipeline.
pub struct Runner {
    binary: PathBuf,
    /// Root directory for per-call temp directories (defaults to the
    /// system temp dir)
    workdir_root: Option<PathBuf>,
}

impl Runner {
    /// Create a runner for an explicit MADX executable path
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            workdir_root: None,
        }
    }

    /// Create a runner using the platform-resolved packaged binary.
    ///
    /// Fails with a `Configuration` error on unsupported platforms.
    pub fn from_resolved() -> Result<Self, MadxError> {
        Ok(Self::new(binary::resolve()?))
    }

    /// Place per-call temp directories under `root` instead of the system
    /// temp dir
    pub fn with_workdir_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workdir_root = Some(root.into());
        self
    }

    /// Execute a script and parse the redirected output file.
    ///
    /// Parse failures and missing output files do not error: they surface
    /// as `OutputData::None` with the reason in the result's log. Only
    /// configuration and IO problems (unlaunchable binary, broken pipes)
    /// return `Err`.
    pub fn execute(&self, script: &str) -> Result<ExecutionResult, MadxError> {
        self.run(script, false)
    }

    /// Execute a script and return the output file's lines verbatim,
    /// bypassing the format parsers.
    pub fn execute_raw(&self, script: &str) -> Result<ExecutionResult, MadxError> {
        self.run(script, true)
    }

    fn run(&self, script: &str, raw: bool) -> Result<ExecutionResult, MadxError> {
        // The TempDir guard removes the directory (and any output file in
        // it) on every exit path out of this function.
        let workdir = self.create_workdir()?;
        let output_path = workdir.path().join(OUTPUT_FILE);

        let rewritten = redirect_output(script, &output_path);

        let mut log = String::new();
        let (stdout, stderr) = self.spawn_and_capture(&rewritten.text, &mut log)?;

        let data = parser::read_output(rewritten.mode, &output_path, raw, &mut log);

        Ok(ExecutionResult {
            data,
            stdout,
            stderr,
            log,
        })
    }

    /// Spawn the binary, feed it the script on stdin, and capture console
    /// text until exit. The exit status is logged, never treated as an
    /// error: the output file is the caller's failure signal.
    fn spawn_and_capture(
        &self,
        input: &str,
        log: &mut String,
    ) -> Result<(Vec<String>, Vec<String>), MadxError> {
        if !binary::looks_runnable(&self.binary) {
            return Err(MadxError::config(format!(
                "madx binary not found: {}",
                self.binary.display()
            )));
        }

        let mut child = Command::new(&self.binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                MadxError::config(format!(
                    "failed to launch madx binary {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        {
            // Scoped take so stdin is closed before waiting
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| MadxError::config("madx child has no stdin handle"))?;
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                // A child that crashes or rejects the script at startup
                // stops draining stdin; the write then breaks the pipe.
                // That is a madx failure, not ours: carry on and let the
                // absent output file signal it.
                if e.kind() == std::io::ErrorKind::BrokenPipe {
                    logf(log, "madx stopped reading the script before the end");
                } else {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            logf(
                log,
                &format!(
                    "madx exited with {} (not treated as an error)",
                    output.status
                ),
            );
        }

        let stdout = split_lines(&output.stdout);
        let stderr = split_lines(&output.stderr);
        Ok((stdout, stderr))
    }

    fn create_workdir(&self) -> Result<tempfile::TempDir, MadxError> {
        let builder_result = if let Some(ref root) = self.workdir_root {
            std::fs::create_dir_all(root)?;
            tempfile::Builder::new().prefix("madx-").tempdir_in(root)
        } else {
            tempfile::Builder::new().prefix("madx-").tempdir()
        };
        builder_result.map_err(MadxError::from)
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_configuration_error() {
        let runner = Runner::new("/nonexistent/madx-binary");
        let err = runner.execute("twiss, sequence=ring, file=\"x.dat\";").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines(b"a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines(b""), Vec::<String>::new());
    }
}
