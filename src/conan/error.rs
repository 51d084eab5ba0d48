//! Error types for the Conan orchestration layer

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the Conan layer.
///
/// Everything propagates synchronously to the caller; nothing is logged and
/// swallowed here. Presentation and retry policy belong to the binary.
#[derive(Debug, Error)]
pub enum ConanError {
    /// No `conan` executable on the search path.
    #[error("Conan executable not found")]
    ExecutableNotFound,

    /// A directory contains neither of the recognized manifest names.
    #[error("Could not find conanfile in path {0}")]
    ConanfileNotFound(PathBuf),

    /// A path is not an existing, recognized manifest file.
    #[error("Invalid path {0}")]
    InvalidPath(PathBuf),

    /// A string does not match the `package/version[@user/channel]` grammar.
    #[error("Invalid Conan reference {0:?}")]
    InvalidReference(String),

    /// The subprocess exited with a non-zero code.
    ///
    /// The display text is exactly the captured stderr. Callers match on
    /// message content, so it must not be wrapped or annotated.
    #[error("{stderr}")]
    Command { stderr: String },

    /// The subprocess exited successfully but its output did not contain
    /// the expected structure.
    #[error("unexpected conan output: {0}")]
    MalformedOutput(String),

    /// Spawning or talking to the subprocess failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
