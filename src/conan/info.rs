//! Dependency graph ("info") command and output parsing
//!
//! The two tool generations report the dependency graph differently:
//!
//! - v1 (`conan info <manifest> --json`) prints free-form diagnostic lines
//!   (version-range resolution notices and the like) followed by a single
//!   JSON array of node objects.
//! - v2 (`conan graph info <manifest> --format=json`) prints a JSON object
//!   with the graph keyed by node id.
//!
//! Each shape gets its own recognizer; a recognizer either fully decodes
//! its format or declines, and the first success wins. A zero exit whose
//! stdout matches neither recognizer is malformed output, never an empty
//! result.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::conan::error::ConanError;
use crate::conan::locator::ConanExecutable;
use crate::conan::process;

/// Direct dependencies of the root of a resolved dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConanInfo {
    /// Identity of the root node, typically the manifest file name.
    pub reference: String,
    /// Direct requirements, in listed order.
    pub requires: Vec<String>,
    /// Direct build-time requirements, in listed order.
    pub build_requires: Vec<String>,
}

/// One node of the v1 JSON array.
#[derive(Debug, Deserialize)]
struct InfoNode {
    reference: String,
    is_ref: Option<bool>,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    build_requires: Vec<String>,
}

/// The v2 graph object.
#[derive(Debug, Deserialize)]
struct GraphOutput {
    graph: Graph,
}

#[derive(Debug, Deserialize)]
struct Graph {
    nodes: HashMap<String, GraphNode>,
}

#[derive(Debug, Deserialize)]
struct GraphNode {
    #[serde(default, rename = "ref")]
    reference: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    dependencies: HashMap<String, GraphDependency>,
}

#[derive(Debug, Deserialize)]
struct GraphDependency {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default)]
    direct: bool,
    #[serde(default)]
    build: bool,
}

/// Run the dependency-graph command for `conanfile` and parse its output.
pub(crate) async fn run_info(
    executable: &ConanExecutable,
    conanfile: &Path,
) -> Result<ConanInfo, ConanError> {
    let output = if executable.major() >= 2 {
        process::run(
            &executable.path,
            [
                OsStr::new("graph"),
                OsStr::new("info"),
                conanfile.as_os_str(),
                OsStr::new("--format=json"),
            ],
            None,
        )
        .await?
    } else {
        process::run(
            &executable.path,
            [
                OsStr::new("info"),
                conanfile.as_os_str(),
                OsStr::new("--json"),
            ],
            None,
        )
        .await?
    };
    if !output.success() {
        return Err(ConanError::Command {
            stderr: output.stderr_text(),
        });
    }

    let root = conanfile
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_info_output(&output.stdout_text(), &root)
}

/// Try the node-array recognizer, then the graph recognizer.
pub(crate) fn parse_info_output(stdout: &str, root: &str) -> Result<ConanInfo, ConanError> {
    if let Some(info) = parse_node_array(stdout, root)? {
        return Ok(info);
    }
    if let Some(info) = parse_dependency_graph(stdout, root)? {
        return Ok(info);
    }
    Err(ConanError::MalformedOutput(
        "no dependency graph in conan info output".to_string(),
    ))
}

/// v1 recognizer: locate the JSON array and pick the root node.
///
/// The array is found by trying every `[` as a start and decoding from
/// there to the end of the stream; diagnostic text before it is ignored.
/// The root is the node whose reference equals the manifest file name,
/// falling back to the node the tool marks as not-a-reference (a manifest
/// that declares its own name makes the first rule miss).
fn parse_node_array(stdout: &str, root: &str) -> Result<Option<ConanInfo>, ConanError> {
    let Some(nodes) = extract_json_array(stdout) else {
        return Ok(None);
    };
    debug!(nodes = nodes.len(), "decoded dependency graph node array");

    let node = nodes
        .iter()
        .find(|node| node.reference == root)
        .or_else(|| nodes.iter().find(|node| node.is_ref == Some(false)))
        .ok_or_else(|| {
            ConanError::MalformedOutput(format!("dependency graph has no root node for {root:?}"))
        })?;

    Ok(Some(ConanInfo {
        reference: node.reference.clone(),
        requires: node.requires.clone(),
        build_requires: node.build_requires.clone(),
    }))
}

/// First `[` from which the rest of the stream decodes as a node array.
fn extract_json_array(stdout: &str) -> Option<Vec<InfoNode>> {
    stdout
        .match_indices('[')
        .find_map(|(start, _)| serde_json::from_str(stdout[start..].trim_end()).ok())
}

/// v2 recognizer: the whole stream is a graph object rooted at node `"0"`.
///
/// Direct dependency edges are split into requirements and build
/// requirements by their `build` flag, ordered by node id as emitted.
fn parse_dependency_graph(stdout: &str, root: &str) -> Result<Option<ConanInfo>, ConanError> {
    let Ok(parsed) = serde_json::from_str::<GraphOutput>(stdout.trim()) else {
        return Ok(None);
    };
    let node = parsed.graph.nodes.get("0").ok_or_else(|| {
        ConanError::MalformedOutput("dependency graph has no root node \"0\"".to_string())
    })?;

    let mut edges: Vec<(u64, &GraphDependency)> = node
        .dependencies
        .iter()
        .filter_map(|(id, dependency)| id.parse().ok().map(|id| (id, dependency)))
        .collect();
    edges.sort_by_key(|(id, _)| *id);

    let mut requires = Vec::new();
    let mut build_requires = Vec::new();
    for (_, dependency) in edges {
        if !dependency.direct {
            continue;
        }
        if dependency.build {
            build_requires.push(dependency.reference.clone());
        } else {
            requires.push(dependency.reference.clone());
        }
    }

    let reference = node
        .label
        .clone()
        .or_else(|| node.reference.clone().filter(|r| !r.is_empty()))
        .unwrap_or_else(|| root.to_string());
    Ok(Some(ConanInfo {
        reference,
        requires,
        build_requires,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1_INFO_STDOUT: &str = concat!(
        "Version ranges solved\n",
        "    Version range '>=2.10.0' required by 'conanfile.txt' resolved to 'catch2/2.13.7' in local cache\n",
        "    Version range '>=3.20' required by 'conanfile.txt' resolved to 'cmake/3.22.0' in local cache\n",
        "\n",
        r#"[{"reference": "conanfile.txt", "is_ref": false, "display_name": "conanfile.txt", "id": "c5cf74a5", "requires": ["catch2/2.13.7", "fmt/8.0.0", "spdlog/1.9.0", "nlohmann_json/3.7.3"], "build_requires": ["cmake/3.22.0"]}, {"reference": "catch2/2.13.7", "is_ref": true, "license": ["BSL-1.0"], "required_by": ["conanfile.txt"]}, {"reference": "cmake/3.22.0", "is_ref": true, "required_by": ["conanfile.txt"]}, {"reference": "fmt/8.0.0", "is_ref": true, "required_by": ["spdlog/1.9.0", "conanfile.txt"]}, {"reference": "nlohmann_json/3.7.3", "is_ref": true, "required_by": ["conanfile.txt"]}, {"reference": "spdlog/1.9.0", "is_ref": true, "required_by": ["conanfile.txt"], "requires": ["fmt/8.0.0"]}]"#,
        "\n",
    );

    #[test]
    fn node_array_parses_despite_leading_diagnostics() {
        let info = parse_info_output(V1_INFO_STDOUT, "conanfile.txt").unwrap();
        assert_eq!(info.reference, "conanfile.txt");
        assert_eq!(
            info.requires,
            [
                "catch2/2.13.7",
                "fmt/8.0.0",
                "spdlog/1.9.0",
                "nlohmann_json/3.7.3",
            ]
        );
        assert_eq!(info.build_requires, ["cmake/3.22.0"]);
    }

    #[test]
    fn missing_dependency_arrays_are_empty_not_errors() {
        let stdout = r#"[{"reference": "conanfile.py", "is_ref": false}]"#;
        let info = parse_info_output(stdout, "conanfile.py").unwrap();
        assert_eq!(info.reference, "conanfile.py");
        assert!(info.requires.is_empty());
        assert!(info.build_requires.is_empty());
    }

    #[test]
    fn named_root_falls_back_to_the_non_reference_node() {
        // A manifest declaring its own name roots the graph at a named
        // reference instead of the file name.
        let stdout = r#"[{"reference": "myapp/0.1.0", "is_ref": false, "requires": ["fmt/8.0.0"]}, {"reference": "fmt/8.0.0", "is_ref": true}]"#;
        let info = parse_info_output(stdout, "conanfile.py").unwrap();
        assert_eq!(info.reference, "myapp/0.1.0");
        assert_eq!(info.requires, ["fmt/8.0.0"]);
    }

    #[test]
    fn output_without_any_graph_is_malformed() {
        let err = parse_info_output("WARN: nothing to see here\n", "conanfile.txt").unwrap_err();
        assert!(matches!(err, ConanError::MalformedOutput(_)));
    }

    #[test]
    fn array_without_a_root_node_is_malformed() {
        let stdout = r#"[{"reference": "fmt/8.0.0", "is_ref": true}]"#;
        let err = parse_info_output(stdout, "conanfile.txt").unwrap_err();
        assert!(matches!(err, ConanError::MalformedOutput(_)));
    }

    #[test]
    fn brackets_inside_diagnostics_do_not_confuse_extraction() {
        let stdout = concat!(
            "WARN [deprecated] something\n",
            r#"[{"reference": "conanfile.txt", "is_ref": false, "requires": ["fmt/8.0.0"]}]"#,
        );
        let info = parse_info_output(stdout, "conanfile.txt").unwrap();
        assert_eq!(info.requires, ["fmt/8.0.0"]);
    }

    #[test]
    fn graph_object_splits_direct_edges_by_build_flag() {
        let stdout = r#"{
            "graph": {
                "nodes": {
                    "0": {
                        "ref": "",
                        "label": "conanfile.txt",
                        "dependencies": {
                            "1": {"ref": "fmt/8.0.0", "direct": true, "build": false},
                            "2": {"ref": "cmake/3.22.0", "direct": true, "build": true},
                            "3": {"ref": "zlib/1.2.11", "direct": false, "build": false}
                        }
                    },
                    "1": {"ref": "fmt/8.0.0", "dependencies": {}}
                }
            }
        }"#;
        let info = parse_info_output(stdout, "conanfile.txt").unwrap();
        assert_eq!(info.reference, "conanfile.txt");
        assert_eq!(info.requires, ["fmt/8.0.0"]);
        assert_eq!(info.build_requires, ["cmake/3.22.0"]);
    }

    #[test]
    fn graph_object_without_root_node_is_malformed() {
        let stdout = r#"{"graph": {"nodes": {"1": {"ref": "fmt/8.0.0"}}}}"#;
        let err = parse_info_output(stdout, "conanfile.txt").unwrap_err();
        assert!(matches!(err, ConanError::MalformedOutput(_)));
    }
}
