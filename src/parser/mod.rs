//! Output classification and parsing
//!
//! Selects the parser matching the detected output mode and reads the
//! temporary output file. Failures here are deliberately non-fatal: a
//! missing file, an unrecognized mode, or a malformed file all surface as
//! `OutputData::None` with a note in the diagnostics log. Callers detect
//! failure by checking for absent data, not by catching errors.

pub mod save;
pub mod table;

use std::path::Path;
use crate::error::MadxError;
use crate::output::{logf, OutputData};
use crate::rewrite::OutputMode;

/// Read and parse the temporary output file for the detected mode.
///
/// With `raw` set, parsing is bypassed and the file's lines are returned
/// verbatim regardless of mode.
pub fn read_output(mode: OutputMode, path: &Path, raw: bool, log: &mut String) -> OutputData {
    if raw {
        return match read_file(path) {
            Ok(text) => OutputData::Raw(text.lines().map(str::to_string).collect()),
            Err(e) => {
                logf(log, &e.to_string());
                OutputData::None
            }
        };
    }

    if mode == OutputMode::None {
        logf(
            log,
            "no output-producing statement recognized; skipping output parsing",
        );
        return OutputData::None;
    }

    let text = match read_file(path) {
        Ok(text) => text,
        Err(e) => {
            logf(log, &e.to_string());
            return OutputData::None;
        }
    };

    let parsed = match mode {
        OutputMode::Twiss | OutputMode::Write => table::parse(&text, log).map(OutputData::Twiss),
        OutputMode::Save => Ok(OutputData::Variables(save::parse(&text))),
        OutputMode::None => unreachable!("handled above"),
    };

    match parsed {
        Ok(data) => data,
        Err(e) => {
            logf(log, &format!("failed to parse {} output: {}", mode, e));
            OutputData::None
        }
    }
}

/// Read the output file, mapping absence to an `OutputMissing` error so
/// the caller's log says what actually happened.
fn read_file(path: &Path) -> Result<String, MadxError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MadxError::output_missing(format!(
                "madx produced no output file at {} (script rejected or process crashed?)",
                path.display()
            ))
        } else {
            e.into()
        }
    })
}
