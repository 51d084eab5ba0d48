//! Conan executable lookup and memoization
//!
//! Resolving the executable costs a PATH scan plus a `conan --version`
//! subprocess, so [`ConanLocator`] memoizes the result. The cache is an
//! explicitly owned object with `get_or_resolve` and `invalidate`
//! operations rather than implicit global state, which keeps the lifecycle
//! and the test-reset semantics visible. Once populated the slot is only
//! read, so concurrent lookups are safe; `invalidate` is meant for
//! sequential use (tests, PATH changes within a process).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::conan::error::ConanError;
use crate::conan::process;
use crate::config::CONAN_EXECUTABLE_NAMES;
use crate::version::Version;

/// The resolved Conan executable.
#[derive(Debug, Clone)]
pub struct ConanExecutable {
    pub path: PathBuf,
    pub version: Version,
}

impl ConanExecutable {
    /// Tool generation, 1 or 2. The generations differ in output formats,
    /// so command construction branches on this.
    pub fn major(&self) -> u64 {
        self.version.major()
    }
}

/// Memoizing resolver for the Conan executable.
#[derive(Debug, Default)]
pub struct ConanLocator {
    slot: Mutex<Option<Arc<ConanExecutable>>>,
}

impl ConanLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized executable, resolving it on first use.
    pub async fn get_or_resolve(&self) -> Result<Arc<ConanExecutable>, ConanError> {
        let mut slot = self.slot.lock().await;
        if let Some(executable) = slot.as_ref() {
            debug!(path = %executable.path.display(), "conan executable cache hit");
            return Ok(Arc::clone(executable));
        }
        let executable = Arc::new(resolve().await?);
        *slot = Some(Arc::clone(&executable));
        Ok(executable)
    }

    /// Clear the memoized result so the next lookup resolves again.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

/// Scan PATH and query the executable's version.
async fn resolve() -> Result<ConanExecutable, ConanError> {
    let path = search_path().ok_or(ConanError::ExecutableNotFound)?;

    let output = process::run(&path, ["--version"], None).await?;
    if !output.success() {
        return Err(ConanError::Command {
            stderr: output.stderr_text(),
        });
    }
    let stdout = output.stdout_text();
    let version = parse_version_output(&stdout).ok_or_else(|| {
        ConanError::MalformedOutput(format!("no version in {:?}", stdout.trim()))
    })?;

    if !matches!(version.major(), 1 | 2) {
        warn!(%version, "unrecognized conan major version");
    }
    info!(path = %path.display(), %version, "resolved conan executable");
    Ok(ConanExecutable { path, version })
}

/// First executable on PATH matching one of the expected names.
fn search_path() -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        for name in CONAN_EXECUTABLE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() && is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// First whitespace token of the version output that parses as a version
/// (the tool prints a line like `Conan version 2.0.17`).
fn parse_version_output(stdout: &str) -> Option<Version> {
    stdout
        .split_whitespace()
        .find_map(|token| token.parse::<Version>().ok())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows executability comes from the file extension, which the
/// candidate names already encode.
#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}
