//! Version parsing and ordering for Conan version strings
//!
//! Conan does not mandate semver: recipes in the wild use partial versions
//! (`1.2`), `v`-prefixed tags, four-part releases (`1.2.3.4`) and suffixed
//! patch letters (`1.1.1q`). [`Version`] parses all of these into a single
//! representation with a total order so that "newest available version" is
//! always well defined.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// Leading numeric release components, optionally `v`-prefixed, with an
/// arbitrary tail (prerelease, post-release suffix, build metadata).
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?(?P<release>\d+(?:\.\d+)*)(?P<tail>.*)$").unwrap());

/// Error for strings that cannot be interpreted as a version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version {0:?}")]
pub struct VersionError(pub String);

/// The most significant position in which two versions differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VersionPart {
    Major,
    Minor,
    Patch,
}

/// One identifier of a prerelease or post-release tail.
///
/// Numeric identifiers order before textual ones and compare by value,
/// mirroring semver precedence; digit and letter runs are split so that
/// `rc10` orders after `rc9`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Number(u64),
    Text(String),
}

/// A parsed version string.
///
/// Ordering follows semver precedence extended to loose inputs: release
/// components compare numerically with missing parts as zero, a plain
/// release orders above any of its prereleases, post-release suffixes
/// (`1.1.1q`, `1.2.3.4`) order above the bare release, and build metadata
/// is ignored for precedence. The original string breaks remaining ties so
/// the order stays consistent with equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    release: Vec<u64>,
    post: Vec<Segment>,
    pre: Vec<Segment>,
    build: Option<String>,
    raw: String,
}

impl Version {
    pub fn major(&self) -> u64 {
        self.release[0]
    }

    pub fn minor(&self) -> u64 {
        self.release.get(1).copied().unwrap_or(0)
    }

    pub fn patch(&self) -> u64 {
        self.release.get(2).copied().unwrap_or(0)
    }

    /// The most significant part in which `self` and `other` differ, or
    /// `None` when they are semantically equal (build metadata and
    /// formatting differences like `1.0` vs `1.0.0` do not count).
    pub fn difference(&self, other: &Version) -> Option<VersionPart> {
        if self.major() != other.major() {
            Some(VersionPart::Major)
        } else if self.minor() != other.minor() {
            Some(VersionPart::Minor)
        } else if self.semantic_cmp(other) != Ordering::Equal {
            Some(VersionPart::Patch)
        } else {
            None
        }
    }

    /// Precedence comparison ignoring build metadata and raw formatting.
    fn semantic_cmp(&self, other: &Version) -> Ordering {
        cmp_release(&self.release, &other.release)
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // A release orders above its prereleases.
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let captures = VERSION_RE
            .captures(raw)
            .ok_or_else(|| VersionError(s.to_string()))?;
        let release = captures["release"]
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionError(s.to_string()))?;

        let tail = &captures["tail"];
        let (tail, build) = match tail.split_once('+') {
            Some((tail, build)) => (tail, Some(build.to_string())),
            None => (tail, None),
        };
        let (pre, post) = match tail.strip_prefix('-') {
            Some(rest) => (split_segments(rest), Vec::new()),
            None => (Vec::new(), split_segments(tail)),
        };

        Ok(Version {
            release,
            post,
            pre,
            build,
            raw: raw.to_string(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semantic_cmp(other)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare release component lists, treating missing components as zero.
fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// Split a version tail into comparable identifiers.
///
/// Separators (`.`, `-`, `_`) are dropped and runs of digits are kept apart
/// from runs of other characters, so `rc1.2` becomes `["rc", 1, 2]`.
fn split_segments(tail: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut numeric = false;

    let mut flush = |buffer: &mut String, numeric: bool| {
        if buffer.is_empty() {
            return;
        }
        let segment = match buffer.parse::<u64>() {
            Ok(n) if numeric => Segment::Number(n),
            _ => Segment::Text(std::mem::take(buffer)),
        };
        buffer.clear();
        segments.push(segment);
    };

    for c in tail.chars() {
        if matches!(c, '.' | '-' | '_') {
            flush(&mut current, numeric);
            continue;
        }
        if current.is_empty() {
            numeric = c.is_ascii_digit();
        } else if numeric != c.is_ascii_digit() {
            flush(&mut current, numeric);
            numeric = c.is_ascii_digit();
        }
        current.push(c);
    }
    flush(&mut current, numeric);

    segments
}
