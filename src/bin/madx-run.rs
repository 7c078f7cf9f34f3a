//! madx-run CLI
//!
//! Execute a MADX script file and print the parsed output.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use madx_runner::{OutputData, Runner, Scalar, Table};

#[derive(Parser, Debug)]
#[command(name = "madx-run")]
#[command(version)]
#[command(about = "Execute a MADX script and print the parsed output")]
struct Cli {
    /// Script file to execute
    script: PathBuf,

    /// Print the output file's lines verbatim instead of parsing them
    #[arg(short, long)]
    raw: bool,

    /// Path to the madx executable (default: platform-resolved)
    #[arg(long)]
    binary: Option<PathBuf>,

    /// Also print captured console text and diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let script = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("failed to read script {}", cli.script.display()))?;

    let runner = match cli.binary {
        Some(path) => Runner::new(path),
        None => Runner::from_resolved().context("no madx binary available")?,
    };

    let result = if cli.raw {
        runner.execute_raw(&script)?
    } else {
        runner.execute(&script)?
    };

    if cli.verbose {
        for line in &result.stdout {
            eprintln!("  {}", line);
        }
        for line in &result.stderr {
            eprintln!("! {}", line);
        }
        if !result.log.is_empty() {
            eprintln!("--- diagnostics ---");
            for line in result.log.lines() {
                eprintln!("  {}", line);
            }
        }
    }

    match &result.data {
        OutputData::Raw(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        OutputData::Variables(vars) => {
            let mut names: Vec<_> = vars.keys().collect();
            names.sort();
            for name in names {
                println!("{} = {}", name, vars[name]);
            }
        }
        OutputData::Twiss(data) => {
            let mut names: Vec<_> = data.globals.keys().collect();
            names.sort();
            for name in names {
                println!("@ {:<16} {}", name, data.globals[name]);
            }
            print_table(&data.table);
        }
        OutputData::None => {
            eprintln!("no parseable output (see --verbose for details)");
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Render the table with per-column widths wide enough for every cell.
fn print_table(table: &Table) {
    let mut widths: Vec<usize> = table.columns.iter().map(String::len).collect();
    let rendered: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(Scalar::to_string).collect())
        .collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let header: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
        .collect();
    println!("{}", header.join("  "));

    for row in &rendered {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
            .collect();
        println!("{}", cells.join("  "));
    }
}
