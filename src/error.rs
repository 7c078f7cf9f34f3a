//! Runner errors

use std::fmt;

/// The kind of runner error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable MADX binary for this platform, or it could not be launched
    Configuration,
    /// IO error talking to the child process or the filesystem
    Io,
    /// Expected output file absent after process exit
    OutputMissing,
    /// Output file present but malformed for the detected mode
    Parse,
}

/// A runner error with optional line context for parse failures
#[derive(Debug, Clone)]
pub struct MadxError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<usize>,
}

impl MadxError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, msg)
    }

    pub fn output_missing(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutputMissing, msg)
    }

    pub fn parse_at(msg: impl Into<String>, line: usize) -> Self {
        let mut e = Self::new(ErrorKind::Parse, msg);
        e.line = Some(line);
        e
    }
}

impl fmt::Display for MadxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {}: ", line)?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for MadxError {}

impl From<std::io::Error> for MadxError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}
