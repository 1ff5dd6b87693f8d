//! Schema bundle loader
//!
//! Reads the five schema documents from an unpacked package tree and
//! extracts the format version list from the meta schema.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::{Result, SketchError};
use crate::fetch;

/// The five schema documents shipped under `dist/` plus the format
/// version list from `meta.properties.version.enum`.
#[derive(Debug, Clone)]
pub struct SchemaBundle {
    /// Newest format version in the bundle (0 if none declared)
    pub version: i64,
    /// All format versions the bundle declares
    pub versions: Vec<i64>,
    pub document: Value,
    pub file_format: Value,
    pub meta: Value,
    pub page: Value,
    pub user: Value,
}

/// Load the schema bundle from an unpacked package root.
pub fn load_bundle(package_root: &Path) -> Result<SchemaBundle> {
    let dist = package_root.join("dist");
    let document = read_schema(&dist, "document.schema.json")?;
    let file_format = read_schema(&dist, "file-format.schema.json")?;
    let meta = read_schema(&dist, "meta.schema.json")?;
    let page = read_schema(&dist, "page.schema.json")?;
    let user = read_schema(&dist, "user.schema.json")?;

    let versions: Vec<i64> = meta
        .pointer("/properties/version/enum")
        .and_then(Value::as_array)
        .map(|values| values.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    let version = versions.last().copied().unwrap_or(0);
    info!(version, count = versions.len(), "loaded schema bundle");

    Ok(SchemaBundle {
        version,
        versions,
        document,
        file_format,
        meta,
        page,
        user,
    })
}

/// Fetch, unpack and load the schema bundle for a published version.
pub fn fetch_bundle(version: &str, registry: &str, package_name: &str) -> Result<SchemaBundle> {
    let package = fetch::fetch_package(registry, package_name)?;
    let unpacked = fetch::download_tarball(&package, version)?;
    load_bundle(unpacked.path())
}

fn read_schema(dist: &Path, name: &str) -> Result<Value> {
    let path = dist.join(name);
    let content = fs::read_to_string(&path)
        .map_err(|e| SketchError::InvalidArchive(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| SketchError::InvalidArchive(format!("{}: {}", path.display(), e)))
}
