//! End-to-end pipeline tests against a fake MADX binary
//!
//! A small shell script stands in for the real executable: it reads the
//! rewritten script from stdin, optionally extracts the redirected
//! `file="..."` path, and writes output there. This exercises the real
//! rewrite → spawn → capture → parse → cleanup path.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use madx_runner::{OutputData, Runner, Scalar, Script};

/// Write an executable fake-madx script. `body` runs after the rewritten
/// instruction text has been captured into `$script`.
fn fake_madx(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-madx");
    let contents = format!("#!/bin/sh\nscript=$(cat)\n{}\n", body);
    std::fs::write(&path, contents).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Body snippet: extract the first redirected file path into `$out`
const EXTRACT_OUT: &str =
    r#"out=$(printf '%s\n' "$script" | sed -n 's/.*file="\([^"]*\)";.*/\1/p' | head -n 1)"#;

#[test]
fn console_is_captured_without_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let binary = fake_madx(dir.path(), "echo 'MAD-X 5.09.00'\necho 'fatal: no beam' >&2");

    let runner = Runner::new(binary);
    let result = runner.execute("beam, particle=electron;").unwrap();

    assert!(result.data.is_none());
    assert_eq!(result.stdout, vec!["MAD-X 5.09.00"]);
    assert_eq!(result.stderr, vec!["fatal: no beam"]);
    assert!(result.log.contains("skipping output parsing"));
}

#[test]
fn twiss_output_parsed_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "{}\ncat > \"$out\" <<'EOF'\n@ LENGTH %le 10.0\n* NAME S\n$ %s %le\nBPM1 0.0\nEOF",
        EXTRACT_OUT
    );
    let binary = fake_madx(dir.path(), &body);

    let runner = Runner::new(binary);
    let result = runner
        .execute("twiss, sequence=ring, file=\"optics.dat\";")
        .unwrap();

    match &result.data {
        OutputData::Twiss(data) => {
            assert_eq!(data.globals["LENGTH"], Scalar::Number(10.0));
            assert_eq!(data.table.columns, vec!["NAME", "S"]);
            assert_eq!(
                data.table.rows,
                vec![vec![Scalar::Text("BPM1".into()), Scalar::Number(0.0)]]
            );
        }
        other => panic!("expected twiss data, got {:?}", other),
    }
}

#[test]
fn save_output_parsed_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "{}\ncat > \"$out\" <<'EOF'\nkqf = 0.008731;\nkqd = -0.008731;\nEOF",
        EXTRACT_OUT
    );
    let binary = fake_madx(dir.path(), &body);

    let runner = Runner::new(binary);
    let result = runner
        .execute("save, sequence=ring, file=\"strengths.dat\";")
        .unwrap();

    match &result.data {
        OutputData::Variables(vars) => {
            assert_eq!(vars["kqf"], 0.008731);
            assert_eq!(vars["kqd"], -0.008731);
        }
        other => panic!("expected variables, got {:?}", other),
    }
}

#[test]
fn missing_output_file_is_absent_data_not_error() {
    let dir = tempfile::tempdir().unwrap();
    // MADX "rejects" the script: writes nothing, exits nonzero
    let binary = fake_madx(dir.path(), "echo 'syntax error' >&2\nexit 1");

    let runner = Runner::new(binary);
    let result = runner
        .execute("twiss, sequence=ring, file=\"optics.dat\";")
        .unwrap();

    assert!(result.data.is_none());
    assert!(result.log.contains("no output file"));
    assert!(result.log.contains("exited with"));
    assert_eq!(result.stderr, vec!["syntax error"]);
}

#[test]
fn child_exiting_before_reading_stdin_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    // Exits immediately without touching stdin, like madx crashing at
    // startup. No $(cat) preamble here — the pipe must stay undrained.
    let path = dir.path().join("fake-madx");
    std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    // Well past any OS pipe buffer, so the stdin write hits a broken pipe
    let mut script = "! filler line to pad the script;\n".repeat(100_000);
    script.push_str("twiss, sequence=ring, file=\"optics.dat\";\n");

    let runner = Runner::new(path);
    let result = runner.execute(&script).unwrap();

    assert!(result.data.is_none());
    assert!(result.log.contains("stopped reading the script"));
    assert!(result.log.contains("no output file"));
}

#[test]
fn raw_mode_returns_file_lines_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "{}\nprintf 'line one\\nline two\\n' > \"$out\"",
        EXTRACT_OUT
    );
    let binary = fake_madx(dir.path(), &body);

    let runner = Runner::new(binary);
    let result = runner
        .execute_raw("twiss, sequence=ring, file=\"optics.dat\";")
        .unwrap();

    assert_eq!(
        result.data,
        OutputData::Raw(vec!["line one".into(), "line two".into()])
    );
}

#[test]
fn temp_directory_removed_after_success_and_failure() {
    let dir = tempfile::tempdir().unwrap();
    let workroot = dir.path().join("workdirs");

    // Success path: output file written and parsed
    let body = format!("{}\necho 'x = 1.0;' > \"$out\"", EXTRACT_OUT);
    let binary = fake_madx(dir.path(), &body);
    let runner = Runner::new(&binary).with_workdir_root(&workroot);
    let result = runner
        .execute("save, sequence=ring, file=\"s.dat\";")
        .unwrap();
    assert!(matches!(result.data, OutputData::Variables(_)));
    assert_eq!(std::fs::read_dir(&workroot).unwrap().count(), 0);

    // Failure path: malformed output (data row before headers)
    let body = format!("{}\necho 'BPM1 0.0' > \"$out\"", EXTRACT_OUT);
    let binary = fake_madx(dir.path(), &body);
    let runner = Runner::new(&binary).with_workdir_root(&workroot);
    let result = runner
        .execute("twiss, sequence=ring, file=\"o.dat\";")
        .unwrap();
    assert!(result.data.is_none());
    assert!(result.log.contains("failed to parse twiss output"));
    assert_eq!(std::fs::read_dir(&workroot).unwrap().count(), 0);
}

#[test]
fn script_buffer_drives_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!("{}\necho 'k1 = 0.25;' > \"$out\"", EXTRACT_OUT);
    let binary = fake_madx(dir.path(), &body);
    let runner = Runner::new(binary);

    let mut script = Script::new();
    script.append("use, sequence=ring;");
    script.append("save, sequence=ring, file=\"strengths.dat\";");
    let result = script.execute(&runner).unwrap();

    match &result.data {
        OutputData::Variables(vars) => assert_eq!(vars["k1"], 0.25),
        other => panic!("expected variables, got {:?}", other),
    }

    script.clear();
    assert!(script.is_empty());
}
