//! Instruction rewriter
//!
//! MADX writes its results wherever the script's `file="..."` argument
//! points. Before execution the script is scanned for the three
//! output-producing statement shapes and their file argument is replaced
//! with a private temporary path, so the output lands somewhere we can
//! read back and delete:
//!
//! ```text
//! twiss, range=#s/#e, sequence=ring, file="optics.dat";
//! save, sequence=ring, file="strengths.dat";
//! write, table=twiss, file="table.dat";
//! ```
//!
//! Matching is line-anchored and only recognizes a literal filename
//! (alphanumeric plus dots) inside the quotes. Expressions or string
//! concatenations in the file argument are not recognized — such a
//! statement is left untouched and the detected mode stays `None`.

use std::path::Path;
use regex::Regex;

/// Which output-producing statement the rewriter redirected.
///
/// Patterns are checked in the order twiss, save, write; each later match
/// overwrites the recorded mode, so a script containing more than one
/// statement shape reports the last pattern checked that matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// No recognized statement — nothing will be parsed
    None,
    /// `twiss ... file="...";` — table plus global variables
    Twiss,
    /// `save ... file="...";` — flat `name = value;` assignments
    Save,
    /// `write ... file="...";` — same layout as twiss output
    Write,
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputMode::None => "none",
            OutputMode::Twiss => "twiss",
            OutputMode::Save => "save",
            OutputMode::Write => "write",
        };
        f.write_str(s)
    }
}

/// A script with its output redirected to a private path
#[derive(Debug, Clone)]
pub struct RewrittenScript {
    /// The rewritten instruction text
    pub text: String,
    /// Which statement pattern matched last
    pub mode: OutputMode,
}

/// Redirect the output-file argument of recognized statements to `target`.
///
/// Scripts with no recognized statement pass through unmodified with mode
/// `None`; they are still fit for execution, just with nothing to parse.
pub fn redirect_output(script: &str, target: &Path) -> RewrittenScript {
    let target = target.to_string_lossy();

    let mut text = script.to_string();
    let mut mode = OutputMode::None;

    for (keyword, tag) in [
        ("twiss", OutputMode::Twiss),
        ("save", OutputMode::Save),
        ("write", OutputMode::Write),
    ] {
        let (replaced, count) = redirect_statement(&text, keyword, &target);
        if count > 0 {
            text = replaced;
            mode = tag;
        }
    }

    RewrittenScript { text, mode }
}

/// Apply one statement substitution, returning the rewritten text and the
/// number of statements redirected.
fn redirect_statement(text: &str, keyword: &str, target: &str) -> (String, usize) {
    let re = statement_regex(keyword);
    let count = re.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    // Closure replacer so `$` in the target path cannot be misread as a
    // capture group reference.
    let replaced = re.replace_all(text, |caps: &regex::Captures| {
        format!("{}{}{}", &caps[1], target, &caps[2])
    });
    (replaced.into_owned(), count)
}

/// Line-anchored pattern for `<keyword> ... ,file="NAME.EXT";`.
///
/// The filename must be a literal alphanumeric-plus-dot token; anything
/// else is deliberately not matched.
fn statement_regex(keyword: &str) -> Regex {
    let pattern = format!(r#"(?m)^({keyword}.*,\s*file=")[A-Za-z0-9.]+(";)\s*$"#);
    // The pattern is built from a fixed keyword set; compilation cannot fail.
    Regex::new(&pattern).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn target() -> PathBuf {
        PathBuf::from("/tmp/madx-work/madx-output.dat")
    }

    #[test]
    fn test_no_match_passes_through() {
        let script = "beam, particle=electron;\nuse, sequence=ring;\n";
        let rewritten = redirect_output(script, &target());
        assert_eq!(rewritten.mode, OutputMode::None);
        assert_eq!(rewritten.text, script);
    }

    #[test]
    fn test_twiss_redirect() {
        let script = "use, sequence=ring;\ntwiss, range=#s/#e, sequence=ring, file=\"optics.dat\";";
        let rewritten = redirect_output(script, &target());
        assert_eq!(rewritten.mode, OutputMode::Twiss);
        assert!(rewritten
            .text
            .contains("file=\"/tmp/madx-work/madx-output.dat\";"));
        assert!(!rewritten.text.contains("optics.dat"));
        // Everything before the file argument is untouched
        assert!(rewritten.text.contains("twiss, range=#s/#e, sequence=ring,"));
    }

    #[test]
    fn test_save_redirect() {
        let script = "save, sequence=ring, file=\"strengths.dat\";";
        let rewritten = redirect_output(script, &target());
        assert_eq!(rewritten.mode, OutputMode::Save);
        assert!(!rewritten.text.contains("strengths.dat"));
    }

    #[test]
    fn test_write_redirect() {
        let script = "write, table=twiss, file=\"table.dat\";";
        let rewritten = redirect_output(script, &target());
        assert_eq!(rewritten.mode, OutputMode::Write);
        assert!(!rewritten.text.contains("table.dat"));
    }

    #[test]
    fn test_no_space_after_comma() {
        // The original statement shape has no space before file=
        let script = "twiss, sequence=ring,file=\"OptServScript.dat\";";
        let rewritten = redirect_output(script, &target());
        assert_eq!(rewritten.mode, OutputMode::Twiss);
        assert!(!rewritten.text.contains("OptServScript.dat"));
    }

    #[test]
    fn test_last_pattern_wins() {
        // Both twiss and write match; write is checked last and wins.
        let script = "twiss, sequence=ring, file=\"a.dat\";\nwrite, table=twiss, file=\"b.dat\";";
        let rewritten = redirect_output(script, &target());
        assert_eq!(rewritten.mode, OutputMode::Write);
        // Both statements are still redirected
        assert!(!rewritten.text.contains("a.dat"));
        assert!(!rewritten.text.contains("b.dat"));
    }

    #[test]
    fn test_expression_filename_not_matched() {
        let script = "twiss, sequence=ring, file=outname;";
        let rewritten = redirect_output(script, &target());
        assert_eq!(rewritten.mode, OutputMode::None);
        assert_eq!(rewritten.text, script);
    }

    #[test]
    fn test_keyword_must_start_line() {
        let script = "! twiss, sequence=ring, file=\"optics.dat\";";
        let rewritten = redirect_output(script, &target());
        assert_eq!(rewritten.mode, OutputMode::None);
        assert_eq!(rewritten.text, script);
    }

    #[test]
    fn test_multiple_twiss_statements_all_redirected() {
        let script =
            "twiss, sequence=a, file=\"x.dat\";\ntwiss, sequence=b, file=\"y.dat\";";
        let rewritten = redirect_output(script, &target());
        assert_eq!(rewritten.mode, OutputMode::Twiss);
        assert!(!rewritten.text.contains("x.dat"));
        assert!(!rewritten.text.contains("y.dat"));
    }
}
