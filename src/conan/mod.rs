//! Conan orchestration layer
//!
//! Everything that touches the external `conan` executable lives here:
//!
//! - [`locator`]: PATH lookup and memoization of the executable
//! - [`process`]: async subprocess invocation with captured output
//! - [`conanfile`]: manifest lookup (`conanfile.py` / `conanfile.txt`)
//! - [`reference`]: `package/version[@user/channel]` parsing
//! - [`info`]: dependency-graph command and its JSON output parsing
//! - [`search`]: remote-search command and its line-oriented parsing
//! - [`error`]: the error taxonomy of the layer

pub mod conanfile;
pub mod error;
pub mod info;
pub mod locator;
pub mod process;
pub mod reference;
pub mod search;

use std::path::Path;
use std::sync::Arc;

pub use conanfile::find_conanfile;
pub use error::ConanError;
pub use info::ConanInfo;
pub use locator::{ConanExecutable, ConanLocator};
pub use reference::ConanReference;

/// Client for the Conan executable.
///
/// Owns the executable cache and exposes the two query commands. Command
/// invocations are independent of each other, so any number of them may
/// run concurrently on one client; only the first has to pay for the
/// executable resolution.
#[derive(Debug, Default)]
pub struct Conan {
    locator: ConanLocator,
}

impl Conan {
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized executable, resolved on first use.
    pub async fn executable(&self) -> Result<Arc<ConanExecutable>, ConanError> {
        self.locator.get_or_resolve().await
    }

    /// The executable cache, for explicit invalidation.
    pub fn locator(&self) -> &ConanLocator {
        &self.locator
    }

    /// Resolve the dependency graph of `conanfile` and return the root's
    /// direct requirements.
    pub async fn info(&self, conanfile: &Path) -> Result<ConanInfo, ConanError> {
        let executable = self.executable().await?;
        info::run_info(&executable, conanfile).await
    }

    /// Search the configured remotes for `query` and return the matching
    /// references in emission order.
    pub async fn search(&self, query: &str) -> Result<Vec<ConanReference>, ConanError> {
        let executable = self.executable().await?;
        search::run_search(&executable, query).await
    }
}
