//! Conan package reference parsing
//!
//! A reference is the coordinate string Conan uses to identify a package
//! version: `package/version`, optionally qualified by a `@user/channel`
//! namespace.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::conan::error::ConanError;
use crate::version::Version;

/// Conan's token rule: leading alphanumeric or underscore, then 1 to 50
/// further characters from a limited punctuation set. `user` and `channel`
/// are both present or both absent.
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    const TOKEN: &str = "[A-Za-z0-9_][A-Za-z0-9_+.-]{1,50}";
    Regex::new(&format!(
        "^(?P<package>{TOKEN})/(?P<version>{TOKEN})(?:@(?P<user>{TOKEN})/(?P<channel>{TOKEN}))?$"
    ))
    .unwrap()
});

/// A parsed, validated package reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConanReference {
    pub package: String,
    pub version: Version,
    pub user: Option<String>,
    pub channel: Option<String>,
}

impl FromStr for ConanReference {
    type Err = ConanError;

    /// Parse a raw reference string.
    ///
    /// Fails with [`ConanError::InvalidReference`] for anything outside the
    /// grammar: a bare package name, a dangling `@`, a half-specified
    /// user/channel pair, one-character segments, or a version token that
    /// does not parse as a [`Version`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConanError::InvalidReference(s.to_string());
        let captures = REFERENCE_RE.captures(s).ok_or_else(invalid)?;
        let version: Version = captures["version"].parse().map_err(|_| invalid())?;

        Ok(ConanReference {
            package: captures["package"].to_string(),
            version,
            user: captures.name("user").map(|m| m.as_str().to_string()),
            channel: captures.name("channel").map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for ConanReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.version)?;
        if let (Some(user), Some(channel)) = (&self.user, &self.channel) {
            write!(f, "@{user}/{channel}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pkg/0.1.0", "pkg", "0.1.0", None, None)]
    #[case("pkg/0.1.0@user/stable", "pkg", "0.1.0", Some("user"), Some("stable"))]
    #[case("zlib/1.2.11@conan/testing", "zlib", "1.2.11", Some("conan"), Some("testing"))]
    #[case("nlohmann_json/3.7.3", "nlohmann_json", "3.7.3", None, None)]
    fn parse_decomposes_valid_references(
        #[case] input: &str,
        #[case] package: &str,
        #[case] version: &str,
        #[case] user: Option<&str>,
        #[case] channel: Option<&str>,
    ) {
        let reference: ConanReference = input.parse().unwrap();
        assert_eq!(reference.package, package);
        assert_eq!(reference.version, version.parse().unwrap());
        assert_eq!(reference.user.as_deref(), user);
        assert_eq!(reference.channel.as_deref(), channel);
    }

    #[rstest]
    #[case("x")] // no version at all
    #[case("x/1.0.0")] // package name below the two-character minimum
    #[case("xyz/1.0.0@user")] // user without channel
    #[case("xyz/1.0.0@a/b")] // one-character user and channel
    #[case("xyz/1.0.0@user/stable/extra")]
    #[case("pkg/abc")] // version token with no numeric release
    #[case("")]
    fn parse_rejects_invalid_references(#[case] input: &str) {
        let err = input.parse::<ConanReference>().unwrap_err();
        assert!(matches!(err, ConanError::InvalidReference(raw) if raw == input));
    }

    #[test]
    fn display_round_trips_the_canonical_form() {
        for raw in ["fmt/8.0.0", "pkg/0.1.0@user/stable"] {
            let reference: ConanReference = raw.parse().unwrap();
            assert_eq!(reference.to_string(), raw);
        }
    }
}
