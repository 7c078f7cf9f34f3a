//! Execution results
//!
//! Plain-data containers returned to the caller: the parsed output (if
//! any), the captured console text, and a diagnostics log. Exactly one
//! `OutputData` variant is populated per execution, determined by the
//! detected output mode and parse success.

use std::collections::HashMap;

/// A typed scalar from a MADX output file.
///
/// The type is driven by the column/variable format code, not by the
/// token's shape: `%s`-style codes yield `Text`, `%le` yields `Number`.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
}

impl Scalar {
    /// The numeric value, if this scalar is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(_) => None,
        }
    }

    /// The text value, if this scalar is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            Scalar::Number(_) => None,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{}", n),
        }
    }
}

/// A rectangular table: ordered column names and rows of typed cells,
/// one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl Table {
    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Parsed twiss/write output: global summary variables plus the element table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TwissData {
    pub globals: HashMap<String, Scalar>,
    pub table: Table,
}

/// Parsed data from one execution.
///
/// `None` is the failure signal: the script produced no recognized output
/// statement, the output file was missing after exit, or parsing failed
/// (details in the result's log). Callers check for `None` rather than
/// catching errors.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputData {
    None,
    /// Twiss or write output: table plus globals
    Twiss(TwissData),
    /// Save output: `name = value;` assignments
    Variables(HashMap<String, f64>),
    /// Unparsed output file lines (raw mode)
    Raw(Vec<String>),
}

impl OutputData {
    pub fn is_none(&self) -> bool {
        matches!(self, OutputData::None)
    }
}

/// The result of one MADX execution.
///
/// Constructed once per call and returned by value; console text is kept
/// as lines, stdout and stderr separate.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Parsed output, or `None` on any recoverable failure
    pub data: OutputData,
    /// Captured standard output, split into lines
    pub stdout: Vec<String>,
    /// Captured standard error, split into lines
    pub stderr: Vec<String>,
    /// Diagnostics trail: exit status, swallowed parse errors, warnings
    pub log: String,
}

/// Append a diagnostics entry, newline-terminated
pub(crate) fn logf(log: &mut String, msg: &str) {
    log.push_str(msg);
    if !msg.ends_with('\n') {
        log.push('\n');
    }
}
