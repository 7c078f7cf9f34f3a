//! madx-runner: run MAD-X as a subprocess and parse its output files
//!
//! MAD-X is an accelerator-physics simulator consuming a script on stdin
//! and writing results to a file named by the script itself. This crate
//! rewrites the script so that output lands at a private temporary path,
//! runs the binary, and parses whichever output format was produced.
//!
//! # Pipeline
//!
//! ```text
//! Script / &str
//!   → rewrite   (redirect file="..." to a temp path, detect the mode)
//!   → runner    (spawn madx, pipe script to stdin, capture console)
//!   → parser    (classify by mode, parse save or twiss/write format)
//!   → ExecutionResult
//! ```
//!
//! # Output modes
//!
//! | Mode  | Statement                 | Format                          |
//! |-------|---------------------------|---------------------------------|
//! | twiss | `twiss ... file="…";`     | `@` globals + column table      |
//! | save  | `save ... file="…";`      | `name = value;` assignments     |
//! | write | `write ... file="…";`     | same layout as twiss            |
//!
//! # Failure contract
//!
//! Callers always get an `ExecutionResult`; a missing or unparseable
//! output file yields `OutputData::None` with the reason in the result's
//! log, never an error or panic. The temporary output file is removed on
//! every exit path.
//!
//! ```no_run
//! use madx_runner::{Runner, Script, OutputData};
//!
//! let runner = Runner::from_resolved()?;
//! let mut script = Script::new();
//! script.append("call, file=\"ring.madx\";");
//! script.append("twiss, sequence=ring, file=\"optics.dat\";");
//! let result = script.execute(&runner)?;
//! if let OutputData::Twiss(data) = &result.data {
//!     println!("{} rows", data.table.rows.len());
//! }
//! # Ok::<(), madx_runner::MadxError>(())
//! ```

mod binary;
mod error;
mod output;
mod parser;
mod rewrite;
mod runner;
mod script;

pub use binary::resolve as resolve_binary;
pub use error::{ErrorKind, MadxError};
pub use output::{ExecutionResult, OutputData, Scalar, Table, TwissData};
pub use parser::read_output;
pub use rewrite::{redirect_output, OutputMode, RewrittenScript};
pub use runner::Runner;
pub use script::Script;
