//! Manifest lookup
//!
//! Locates the Conan manifest a check should run against. Two manifest
//! names are recognized, tried in preference order: the script-style
//! `conanfile.py`, then the declarative `conanfile.txt`.

use std::path::{Path, PathBuf};

use crate::conan::error::ConanError;
use crate::config::CONANFILE_NAMES;

/// Resolve `path` to an existing manifest file.
///
/// A directory is searched for the recognized manifest names; a file must
/// itself carry one of the recognized names. The returned path is absolute.
pub fn find_conanfile(path: &Path) -> Result<PathBuf, ConanError> {
    if path.is_dir() {
        for name in CONANFILE_NAMES {
            let candidate = path.join(name);
            if candidate.is_file() {
                return Ok(std::path::absolute(candidate)?);
            }
        }
        return Err(ConanError::ConanfileNotFound(path.to_path_buf()));
    }

    let recognized = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| CONANFILE_NAMES.contains(&name));
    if recognized && path.is_file() {
        Ok(std::path::absolute(path)?)
    } else {
        Err(ConanError::InvalidPath(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("conanfile.py")]
    #[case("conanfile.txt")]
    fn finds_manifest_by_directory_and_by_file(#[case] name: &str) {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join(name);

        // Before the manifest exists, both lookups fail.
        let err = find_conanfile(dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("Could not find conanfile in path"));
        let err = find_conanfile(&manifest).unwrap_err();
        assert!(err.to_string().starts_with("Invalid path"));

        std::fs::write(&manifest, "").unwrap();

        let by_dir = find_conanfile(dir.path()).unwrap();
        let by_file = find_conanfile(&manifest).unwrap();
        assert_eq!(by_dir.file_name().unwrap(), name);
        assert_eq!(by_dir, by_file);
        assert!(by_dir.is_absolute());
    }

    #[test]
    fn prefers_script_manifest_over_declarative() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("conanfile.py"), "").unwrap();
        std::fs::write(dir.path().join("conanfile.txt"), "").unwrap();

        let found = find_conanfile(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "conanfile.py");
    }

    #[test]
    fn rejects_unrecognized_file_names() {
        let dir = TempDir::new().unwrap();
        let other = dir.path().join("CMakeLists.txt");
        std::fs::write(&other, "").unwrap();

        let err = find_conanfile(&other).unwrap_err();
        assert!(matches!(err, ConanError::InvalidPath(_)));
    }
}
