//! Update checking for a manifest's direct requirements
//!
//! Composes the Conan layer: resolve the dependency graph of a manifest,
//! search the remotes for every direct requirement concurrently, and
//! compute the newest available version within a caller-chosen upgrade
//! scope (major / minor / patch).

#[cfg(test)]
use mockall::automock;

use std::path::Path;

use futures::stream::{self, StreamExt, TryStreamExt};
use regex::Regex;
use tracing::debug;

use crate::conan::{Conan, ConanError, ConanInfo, ConanReference, find_conanfile};
use crate::config::MAX_CONCURRENT_SEARCHES;
use crate::version::{Version, VersionPart};

/// The queries the checker needs from the Conan layer.
///
/// `Conan` is the production implementation; tests mock this seam.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PackageIndex: Send + Sync {
    /// Direct requirements of the manifest at `conanfile`.
    async fn dependency_info(&self, conanfile: &Path) -> Result<ConanInfo, ConanError>;

    /// References matching `query` in the configured remotes, in emission
    /// order.
    async fn search_remotes(&self, query: &str) -> Result<Vec<ConanReference>, ConanError>;
}

#[async_trait::async_trait]
impl PackageIndex for Conan {
    async fn dependency_info(&self, conanfile: &Path) -> Result<ConanInfo, ConanError> {
        self.info(conanfile).await
    }

    async fn search_remotes(&self, query: &str) -> Result<Vec<ConanReference>, ConanError> {
        self.search(query).await
    }
}

/// Status of one checked requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// No version within the requested scope is newer than the current one.
    UpToDate,
    /// A newer version within the requested scope is available.
    Outdated,
    /// No remote lists the package under the requirement's user/channel.
    NotFound,
}

/// Result of checking one requirement against the remotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckUpdateResult {
    /// The requirement as declared in the manifest.
    pub reference: ConanReference,
    /// Newest found version within the requested scope, if any.
    pub latest: Option<Version>,
    pub status: UpdateStatus,
}

impl CheckUpdateResult {
    /// The version to upgrade to, when one exists.
    pub fn update(&self) -> Option<&Version> {
        match self.status {
            UpdateStatus::Outdated => self.latest.as_ref(),
            _ => None,
        }
    }
}

/// Check every direct requirement of the manifest at `path` (a manifest
/// file or a directory containing one) against the remotes.
///
/// `filters` restricts the check to packages matching any of the given
/// name patterns (`*` wildcards allowed); an empty list checks everything.
/// Results keep the manifest's requirement order, requirements first, then
/// build requirements. Requirement entries that are not valid references
/// (system or editable nodes) are skipped.
pub async fn check_updates<I>(
    index: &I,
    path: &Path,
    target: VersionPart,
    filters: &[String],
) -> Result<Vec<CheckUpdateResult>, ConanError>
where
    I: PackageIndex + ?Sized,
{
    let conanfile = find_conanfile(path)?;
    let info = index.dependency_info(&conanfile).await?;
    let patterns = compile_filters(filters);

    let requirements: Vec<ConanReference> = info
        .requires
        .iter()
        .chain(info.build_requires.iter())
        .filter_map(|raw| match raw.parse::<ConanReference>() {
            Ok(reference) => Some(reference),
            Err(error) => {
                debug!(%raw, %error, "skipping requirement without a parseable reference");
                None
            }
        })
        .filter(|reference| matches_filters(reference, &patterns))
        .collect();

    stream::iter(requirements)
        .map(|reference| async move {
            let found = index.search_remotes(&reference.package).await?;
            Ok(evaluate(reference, found, target))
        })
        .buffered(MAX_CONCURRENT_SEARCHES)
        .try_collect()
        .await
}

/// Classify one requirement against the versions found in the remotes.
fn evaluate(
    reference: ConanReference,
    found: Vec<ConanReference>,
    target: VersionPart,
) -> CheckUpdateResult {
    let candidates: Vec<Version> = found
        .into_iter()
        .filter(|candidate| {
            candidate.package == reference.package
                && candidate.user == reference.user
                && candidate.channel == reference.channel
        })
        .map(|candidate| candidate.version)
        .collect();

    if candidates.is_empty() {
        return CheckUpdateResult {
            reference,
            latest: None,
            status: UpdateStatus::NotFound,
        };
    }

    let current = reference.version.clone();
    let latest = candidates
        .into_iter()
        .filter(|version| within_target(&current, version, target))
        .max();
    let status = match &latest {
        Some(version) if *version > current => UpdateStatus::Outdated,
        _ => UpdateStatus::UpToDate,
    };

    CheckUpdateResult {
        reference,
        latest,
        status,
    }
}

/// Whether `candidate` is inside the upgrade scope relative to `current`.
fn within_target(current: &Version, candidate: &Version, target: VersionPart) -> bool {
    match target {
        VersionPart::Major => true,
        VersionPart::Minor => candidate.major() == current.major(),
        VersionPart::Patch => {
            candidate.major() == current.major() && candidate.minor() == current.minor()
        }
    }
}

/// Compile `*`-wildcard package name patterns into anchored regexes.
fn compile_filters(filters: &[String]) -> Vec<Regex> {
    filters
        .iter()
        .map(|pattern| {
            let escaped = regex::escape(pattern).replace(r"\*", ".*");
            Regex::new(&format!("^{escaped}$")).unwrap()
        })
        .collect()
}

fn matches_filters(reference: &ConanReference, patterns: &[Regex]) -> bool {
    patterns.is_empty() || patterns.iter().any(|pattern| pattern.is_match(&reference.package))
}
