//! Locating optional sample files and writing scratch files.
//!
//! Real NetCDF samples are not committed. Tests that want one look it up
//! with [`find_test_file`] and skip when it is absent.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Directory holding the workspace `Cargo.toml`.
pub fn workspace_root() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .ancestors()
        .nth(2)
        .unwrap_or(manifest)
        .to_path_buf()
}

/// Sample file directories, most specific first: `$TEST_DATA_DIR`, each
/// library crate's `testdata/`, then the workspace `testdata/`.
pub fn testdata_dirs() -> Vec<PathBuf> {
    let root = workspace_root();
    let mut dirs: Vec<PathBuf> = std::env::var_os("TEST_DATA_DIR")
        .map(PathBuf::from)
        .into_iter()
        .collect();
    for name in ["netcdf-parser", "cf-grid"] {
        dirs.push(root.join("crates").join(name).join("testdata"));
    }
    dirs.push(root.join("testdata"));
    dirs
}

/// First existing `name` among [`testdata_dirs`].
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    testdata_dirs()
        .into_iter()
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}

/// Write `bytes` to `name` in a new temporary directory.
///
/// The file disappears when the returned `TempDir` is dropped.
pub fn write_temp_file(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temporary directory");
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write temporary file");
    (dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").is_file());
    }

    #[test]
    fn test_testdata_dirs_end_at_root() {
        let dirs = testdata_dirs();
        assert_eq!(dirs.last(), Some(&workspace_root().join("testdata")));
        assert!(dirs.iter().any(|d| d.ends_with("crates/cf-grid/testdata")));
    }

    #[test]
    fn test_write_temp_file() {
        let (dir, path) = write_temp_file("grid.nc", b"CDF\x01");
        assert!(path.starts_with(dir.path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"CDF\x01");
    }

    #[test]
    fn test_missing_file() {
        assert!(find_test_file("no-such-sample.nc").is_none());
    }
}
