//! npm registry fetcher
//!
//! Resolves a package version through the registry metadata document,
//! downloads the tarball, and unpacks it into a temporary directory. One
//! request per asset, no retries; the temporary directory is removed when
//! the returned handle drops, on every exit path.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use serde::Deserialize;
use tar::Archive;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{Result, SketchError};

/// Registry serving the schema package.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// The npm package carrying the Sketch file format schemas.
pub const DEFAULT_PACKAGE: &str = "@sketch-hq/sketch-file-format";

/// Distribution info for one published version.
#[derive(Debug, Clone, Deserialize)]
pub struct Dist {
    pub shasum: String,
    pub tarball: String,
}

/// One published version of a package.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub dist: Dist,
}

/// Registry metadata document for a package.
#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    pub name: String,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
    pub versions: HashMap<String, VersionInfo>,
}

impl Package {
    /// Resolve a dist-tag (`latest`, `next`, ...) or literal version.
    pub fn resolve_version(&self, version: &str) -> Result<&VersionInfo> {
        let resolved = self
            .dist_tags
            .get(version)
            .map(String::as_str)
            .unwrap_or(version);
        self.versions.get(resolved).ok_or_else(|| {
            SketchError::Fetch(format!("unknown version {} of {}", resolved, self.name))
        })
    }
}

/// Fetch the registry metadata document for a package.
pub fn fetch_package(registry: &str, package_name: &str) -> Result<Package> {
    let url = format!("{}/{}", registry.trim_end_matches('/'), package_name);
    info!(url = %url, "fetching package metadata");
    let response = reqwest::blocking::get(&url)?;
    if !response.status().is_success() {
        return Err(SketchError::Fetch(format!(
            "{} {}",
            response.status().as_u16(),
            url
        )));
    }
    Ok(response.json()?)
}

/// An unpacked package tree. The backing temporary directory is deleted
/// when this handle drops.
#[derive(Debug)]
pub struct UnpackedPackage {
    _dir: TempDir,
    root: PathBuf,
}

impl UnpackedPackage {
    /// Path to the package root (the tarball's `package/` directory).
    pub fn path(&self) -> &Path {
        &self.root
    }
}

/// Download and unpack the tarball for a version (tag or literal).
pub fn download_tarball(package: &Package, version: &str) -> Result<UnpackedPackage> {
    let info = package.resolve_version(version)?;
    info!(version = %info.version, tarball = %info.dist.tarball, "downloading tarball");
    let response = reqwest::blocking::get(&info.dist.tarball)?;
    if !response.status().is_success() {
        return Err(SketchError::Fetch(format!(
            "{} {}",
            response.status().as_u16(),
            info.dist.tarball
        )));
    }
    let bytes = response.bytes()?;

    let dir = TempDir::new()?;
    let mut archive = Archive::new(GzDecoder::new(Cursor::new(bytes)));
    archive
        .unpack(dir.path())
        .map_err(|e| SketchError::InvalidArchive(e.to_string()))?;

    // npm tarballs root their contents at package/.
    let root = dir.path().join("package");
    if !root.is_dir() {
        return Err(SketchError::InvalidArchive(format!(
            "{} has no package/ root",
            info.dist.tarball
        )));
    }
    debug!(root = %root.display(), "unpacked package");
    Ok(UnpackedPackage { _dir: dir, root })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package() -> Package {
        serde_json::from_str(
            r#"{
                "name": "@sketch-hq/sketch-file-format",
                "dist-tags": {"latest": "3.1.0"},
                "versions": {
                    "3.0.0": {"version": "3.0.0", "dist": {"shasum": "aa", "tarball": "https://example.test/3.0.0.tgz"}},
                    "3.1.0": {"version": "3.1.0", "dist": {"shasum": "bb", "tarball": "https://example.test/3.1.0.tgz"}}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_dist_tag() {
        let package = sample_package();
        let info = package.resolve_version("latest").unwrap();
        assert_eq!(info.version, "3.1.0");
    }

    #[test]
    fn test_resolve_literal_version() {
        let package = sample_package();
        let info = package.resolve_version("3.0.0").unwrap();
        assert_eq!(info.dist.tarball, "https://example.test/3.0.0.tgz");
    }

    #[test]
    fn test_resolve_unknown_version() {
        let package = sample_package();
        let err = package.resolve_version("9.9.9").unwrap_err();
        assert!(matches!(err, SketchError::Fetch(_)));
    }
}
