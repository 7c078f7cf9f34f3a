//! MADX binary resolution
//!
//! The executable location is resolved once per process and cached in a
//! `OnceLock`: uninitialized, then either a resolved path or a recorded
//! failure. Resolution order:
//!
//! 1. the `MADX_BINARY` environment variable;
//! 2. the packaged binary name for this platform/architecture
//!    (`madx-linux64`, `madx-macosx64`), looked for next to the current
//!    executable and then on `PATH`.
//!
//! Unsupported platform/architecture combinations resolve to nothing; the
//! failure surfaces as a `Configuration` error when a runner is built
//! from the resolver.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use crate::error::MadxError;

static MADX_BINARY: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Resolve the MADX executable for this process, caching the answer.
pub fn resolve() -> Result<PathBuf, MadxError> {
    MADX_BINARY
        .get_or_init(locate)
        .clone()
        .ok_or_else(|| {
            MadxError::config(format!(
                "no madx binary available for {}/{} (set MADX_BINARY to override)",
                std::env::consts::OS,
                std::env::consts::ARCH
            ))
        })
}

fn locate() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("MADX_BINARY") {
        return Some(PathBuf::from(path));
    }

    let name = packaged_name()?;

    // Next to the current executable first (packaged layout)
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    let path_env = std::env::var("PATH").unwrap_or_default();
    find_in_path(name, &path_env)
}

/// The packaged binary name for this platform/architecture, if supported.
fn packaged_name() -> Option<&'static str> {
    if cfg!(target_arch = "x86_64") && cfg!(target_os = "linux") {
        Some("madx-linux64")
    } else if cfg!(target_arch = "x86_64") && cfg!(target_os = "macos") {
        Some("madx-macosx64")
    } else {
        None
    }
}

/// Walk PATH looking for an executable file with the given name.
fn find_in_path(name: &str, path_var: &str) -> Option<PathBuf> {
    for dir in std::env::split_paths(path_var) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = dir.join(name);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(meta) = std::fs::metadata(&candidate) {
                if meta.is_file() && meta.permissions().mode() & 0o111 != 0 {
                    return Some(candidate);
                }
            }
        }

        #[cfg(windows)]
        {
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// True if the path exists and looks runnable. Used for eager
/// configuration checks before spawning.
pub(crate) fn looks_runnable(path: &Path) -> bool {
    path.is_file()
}
