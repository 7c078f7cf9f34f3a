//! Save-format parser
//!
//! Save output is a flat list of assignments:
//!
//! ```text
//! kqf = 0.008731;
//! kqd = -0.008731;
//! dipole->angle = 0.0015; ! not matched — name is not a plain identifier
//! ```
//!
//! Lines matching `IDENT = NUMBER;` record `name → f64`; everything else
//! is ignored. The parser never fails — a file with no matching lines
//! yields an empty mapping.

use std::collections::HashMap;
use regex::Regex;

/// Parse save-format text into a variable mapping.
pub fn parse(text: &str) -> HashMap<String, f64> {
    let re = assignment_regex();
    let mut vars = HashMap::new();
    for line in text.lines() {
        if let Some(caps) = re.captures(line) {
            // The value group is loose; skip anything f64 rejects
            if let Ok(value) = caps[2].parse::<f64>() {
                vars.insert(caps[1].to_string(), value);
            }
        }
    }
    vars
}

/// `IDENT = NUMBER;` with optional surrounding whitespace. NUMBER covers
/// decimal and scientific notation.
fn assignment_regex() -> Regex {
    Regex::new(r"(?i)^\s*([a-z][a-z0-9_.$]*)\s*=\s*([-+]?[0-9.][0-9.eE+-]*)\s*;\s*$").unwrap()
}
