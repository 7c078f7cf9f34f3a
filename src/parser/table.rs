//! Twiss/write-format parser
//!
//! Both the `twiss` and `write` statements produce the same layout:
//!
//! ```text
//! @ LENGTH           %le   10.0
//! @ SEQUENCE         %08s  "RING"
//! * NAME             S     BETX
//! $ %s               %le   %le
//!  "BPM1"            0.0   12.5
//! ```
//!
//! `@` lines are global summary variables, `*` names the columns, `$`
//! gives one format code per column, and the remaining non-blank lines
//! are whitespace-delimited data rows. Column names and formats must both
//! appear before the first data row; a data row arriving earlier is a
//! fatal parse error because its cell types would be ambiguous.
//!
//! Line dispatch order matters: a line is tried as a global, then as the
//! column header, then as the format header, and only then as data.

use crate::error::MadxError;
use crate::output::{logf, Scalar, TwissData};

/// Header progress while scanning lines in order
enum Stage {
    AwaitingColumns,
    HaveColumns,
    ReadingData,
}

/// Parse twiss/write-format text into globals plus a table.
///
/// Unknown format codes are expected in the wild and fall back to the raw
/// token (noted in `log`); structural violations (data before headers,
/// arity mismatches, unparsable `%le` values) are errors.
pub fn parse(text: &str, log: &mut String) -> Result<TwissData, MadxError> {
    let mut data = TwissData::default();
    let mut formats: Vec<String> = Vec::new();
    let mut stage = Stage::AwaitingColumns;

    for (i, line) in text.lines().enumerate() {
        let line_number = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('@') {
            let (name, value) = parse_global(rest, line_number, log)?;
            data.globals.insert(name, value);
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('*') {
            if !matches!(stage, Stage::AwaitingColumns) {
                return Err(MadxError::parse_at("duplicate column header", line_number));
            }
            data.table.columns = rest.split_whitespace().map(str::to_string).collect();
            stage = Stage::HaveColumns;
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('$') {
            match stage {
                Stage::AwaitingColumns => {
                    return Err(MadxError::parse_at(
                        "column format line before column name line",
                        line_number,
                    ));
                }
                Stage::HaveColumns => {}
                Stage::ReadingData => {
                    return Err(MadxError::parse_at("duplicate column format line", line_number));
                }
            }
            formats = rest.split_whitespace().map(str::to_string).collect();
            if formats.len() != data.table.columns.len() {
                return Err(MadxError::parse_at(
                    format!(
                        "{} format codes for {} columns",
                        formats.len(),
                        data.table.columns.len()
                    ),
                    line_number,
                ));
            }
            stage = Stage::ReadingData;
            continue;
        }

        // Data row
        if !matches!(stage, Stage::ReadingData) {
            return Err(MadxError::parse_at(
                "data line before column name and format headers",
                line_number,
            ));
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() != data.table.columns.len() {
            return Err(MadxError::parse_at(
                format!(
                    "data row has {} values for {} columns",
                    tokens.len(),
                    data.table.columns.len()
                ),
                line_number,
            ));
        }
        let mut row = Vec::with_capacity(tokens.len());
        for (token, format) in tokens.iter().zip(&formats) {
            row.push(cast(token, format, line_number, log)?);
        }
        data.table.rows.push(row);
    }

    Ok(data)
}

/// Parse one `@ NAME FORMAT VALUE` global. The value may span several
/// tokens (quoted strings with spaces).
fn parse_global(
    rest: &str,
    line_number: usize,
    log: &mut String,
) -> Result<(String, Scalar), MadxError> {
    let mut tokens = rest.split_whitespace();
    let name = tokens
        .next()
        .ok_or_else(|| MadxError::parse_at("global variable line without a name", line_number))?;
    let format = tokens.next().ok_or_else(|| {
        MadxError::parse_at(
            format!("global variable {} has no format code", name),
            line_number,
        )
    })?;
    let value = tokens.collect::<Vec<_>>().join(" ");
    if value.is_empty() {
        return Err(MadxError::parse_at(
            format!("global variable {} has no value", name),
            line_number,
        ));
    }
    let scalar = cast(&value, format, line_number, log)?;
    Ok((name.to_string(), scalar))
}

/// Cast one token according to its format code.
///
/// Codes ending in `s` are strings (enclosing double quotes trimmed),
/// `%le` is a double, and anything else falls back to the raw token with
/// a diagnostic — that fallback never fails.
fn cast(
    token: &str,
    format: &str,
    line_number: usize,
    log: &mut String,
) -> Result<Scalar, MadxError> {
    if format.ends_with('s') {
        return Ok(Scalar::Text(token.trim_matches('"').to_string()));
    }
    if format == "%le" {
        let n: f64 = token.parse().map_err(|_| {
            MadxError::parse_at(format!("invalid %le value {:?}", token), line_number)
        })?;
        return Ok(Scalar::Number(n));
    }
    logf(
        log,
        &format!(
            "line {}: unrecognized format code {:?}, keeping raw token {:?}",
            line_number, format, token
        ),
    );
    Ok(Scalar::Text(token.to_string()))
}
