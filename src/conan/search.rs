//! Remote search command and output parsing
//!
//! The two tool generations print search results differently:
//!
//! - v1 (`conan search --remote all --raw <query>`): groups headed by
//!   `Remote '<name>':`, followed by bare `package/version` lines.
//! - v2 (`conan search <query>`): groups headed by `<name>:`, then an
//!   indented package-name line, then further-indented `package/version`
//!   lines.
//!
//! Both shapes are handled by independent recognizers tried against the
//! same line stream; each fully matches its grouping grammar or declines.
//! Within a recognized stream every line that parses as a bare reference
//! is collected in emission order, across all remote groups. No results is
//! an empty sequence, not an error.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::conan::error::ConanError;
use crate::conan::locator::ConanExecutable;
use crate::conan::process;
use crate::conan::reference::ConanReference;

/// v1 group header: `Remote 'conancenter':`
static REMOTE_HEADER_V1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Remote '[^']+':$").unwrap());

/// v2 group header: `conancenter:` (unindented, single token)
static REMOTE_HEADER_V2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\S+:\s*$").unwrap());

/// Run the remote-search command for `query` and parse its output.
pub(crate) async fn run_search(
    executable: &ConanExecutable,
    query: &str,
) -> Result<Vec<ConanReference>, ConanError> {
    let output = if executable.major() >= 2 {
        process::run(&executable.path, ["search", query], None).await?
    } else {
        process::run(
            &executable.path,
            ["search", "--remote", "all", "--raw", query],
            None,
        )
        .await?
    };
    if !output.success() {
        return Err(ConanError::Command {
            stderr: output.stderr_text(),
        });
    }

    let references = parse_search_output(&output.stdout_text());
    debug!(query, matches = references.len(), "remote search finished");
    Ok(references)
}

/// Parse search output, trying the v1 recognizer, then v2, then a plain
/// reference-per-line scan (which also covers empty output).
pub(crate) fn parse_search_output(stdout: &str) -> Vec<ConanReference> {
    recognize_remote_groups(stdout)
        .or_else(|| recognize_remote_tree(stdout))
        .unwrap_or_else(|| collect_references(stdout.lines()))
}

/// v1 recognizer: declines unless the first non-blank line is a
/// `Remote '<name>':` header.
fn recognize_remote_groups(stdout: &str) -> Option<Vec<ConanReference>> {
    let first = stdout.lines().find(|line| !line.trim().is_empty())?;
    if !REMOTE_HEADER_V1.is_match(first) {
        return None;
    }
    Some(collect_references(stdout.lines()))
}

/// v2 recognizer: declines unless the first non-blank line is an
/// unindented `<name>:` header and the result lines are indented.
fn recognize_remote_tree(stdout: &str) -> Option<Vec<ConanReference>> {
    let first = stdout.lines().find(|line| !line.trim().is_empty())?;
    if !REMOTE_HEADER_V2.is_match(first) {
        return None;
    }
    Some(collect_references(
        stdout.lines().filter(|line| line.starts_with(' ')),
    ))
}

/// Every line that parses as a bare reference, in emission order. Header,
/// package-name and blank lines simply do not parse and are skipped.
fn collect_references<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<ConanReference> {
    lines
        .filter_map(|line| line.trim().parse::<ConanReference>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const V1_SEARCH_STDOUT: &str = "\
Remote 'conancenter':
fmt/5.3.0
fmt/6.0.0
fmt/6.1.0
";

    const V2_SEARCH_STDOUT: &str = "\
conancenter:
  fmt
    fmt/5.3.0
    fmt/6.0.0
    fmt/6.1.0
";

    #[rstest]
    #[case::v1(V1_SEARCH_STDOUT)]
    #[case::v2(V2_SEARCH_STDOUT)]
    fn both_formats_normalize_to_the_same_references(#[case] stdout: &str) {
        let references = parse_search_output(stdout);
        let raw: Vec<String> = references.iter().map(ConanReference::to_string).collect();
        assert_eq!(raw, ["fmt/5.3.0", "fmt/6.0.0", "fmt/6.1.0"]);
    }

    #[test]
    fn multiple_remote_groups_preserve_emission_order() {
        let stdout = "\
Remote 'conancenter':
fmt/6.0.0
fmt/6.1.0

Remote 'mycompany':
fmt/6.1.0
fmt/7.0.0
";
        let raw: Vec<String> = parse_search_output(stdout)
            .iter()
            .map(ConanReference::to_string)
            .collect();
        assert_eq!(raw, ["fmt/6.0.0", "fmt/6.1.0", "fmt/6.1.0", "fmt/7.0.0"]);
    }

    #[test]
    fn empty_output_yields_an_empty_sequence() {
        assert!(parse_search_output("").is_empty());
        assert!(parse_search_output("\n\n").is_empty());
    }

    #[test]
    fn headerless_output_still_collects_parseable_lines() {
        let stdout = "fmt/5.3.0\nnot a reference\nfmt/6.0.0\n";
        let raw: Vec<String> = parse_search_output(stdout)
            .iter()
            .map(ConanReference::to_string)
            .collect();
        assert_eq!(raw, ["fmt/5.3.0", "fmt/6.0.0"]);
    }

    #[test]
    fn user_channel_references_survive_the_scan() {
        let stdout = "Remote 'conancenter':\npkg/0.1.0@user/stable\n";
        let references = parse_search_output(stdout);
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].user.as_deref(), Some("user"));
        assert_eq!(references[0].channel.as_deref(), Some("stable"));
    }

    #[test]
    fn v2_tree_ignores_package_name_lines() {
        // The indented `fmt` line is a package name, not a reference.
        let references = parse_search_output(V2_SEARCH_STDOUT);
        assert!(references.iter().all(|r| r.package == "fmt"));
        assert_eq!(references.len(), 3);
    }
}
