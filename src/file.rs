//! Sketch file container I/O
//!
//! A `.sketch` file is a zip whose top-level members are JSON documents:
//! `document.json`, `meta.json`, `user.json`, one `pages/<uuid>.json` per
//! page and arbitrary `workspace/<name>.json` values. `document.json`
//! stores its pages as `MSJSONFileReference` stubs; the reader expands
//! them into inline page objects and the writer collapses them back.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::TempDir;
use tracing::debug;
use uuid::Uuid;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Result, SketchError};

/// `_class` value of a file reference stub.
pub const FILE_REFERENCE_CLASS: &str = "MSJSONFileReference";

/// `_ref_class` value of a page reference.
pub const PAGE_REFERENCE_CLASS: &str = "MSImmutablePage";

/// A reference to another member of the archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRef {
    #[serde(rename = "_class")]
    pub class: String,
    #[serde(rename = "_ref_class")]
    pub ref_class: String,
    #[serde(rename = "_ref")]
    pub reference: String,
}

impl FileRef {
    /// Reference stub for a page with the given object ID.
    pub fn page(object_id: &str) -> Self {
        Self {
            class: FILE_REFERENCE_CLASS.to_string(),
            ref_class: PAGE_REFERENCE_CLASS.to_string(),
            reference: format!("pages/{object_id}"),
        }
    }
}

/// Arbitrary JSON values keyed by workspace member stem.
pub type Workspace = BTreeMap<String, Value>;

/// Everything a sketch file contains. `document` holds its pages inline.
#[derive(Debug, Clone)]
pub struct Contents {
    pub document: Value,
    pub meta: Value,
    pub user: Value,
    pub workspace: Workspace,
}

/// An in-memory sketch file bound to its path on disk.
#[derive(Debug, Clone)]
pub struct SketchFile {
    pub filepath: PathBuf,
    pub contents: Contents,
}

impl SketchFile {
    pub fn new(filepath: impl Into<PathBuf>, contents: Contents) -> Self {
        Self {
            filepath: filepath.into(),
            contents,
        }
    }

    /// Combined document object ID: the XOR of every page UUID, rendered
    /// as 32 uppercase hex characters.
    pub fn combined_object_id(&self) -> Result<String> {
        let pages = self
            .contents
            .document
            .get("pages")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid(&self.filepath, "document has no pages list"))?;
        let mut combined: u128 = 0;
        for page in pages {
            let id = page
                .get("do_objectID")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(&self.filepath, "page has no do_objectID"))?;
            let parsed = Uuid::parse_str(id)
                .map_err(|e| invalid(&self.filepath, &format!("bad page id {id}: {e}")))?;
            combined ^= parsed.as_u128();
        }
        Ok(format!("{combined:032X}"))
    }
}

fn invalid(path: &Path, message: &str) -> SketchError {
    SketchError::InvalidSketchFile(format!("{}: {}", path.display(), message))
}

fn read_json(zip: &mut ZipArchive<File>, name: &str, path: &Path) -> Result<Value> {
    let mut entry = zip
        .by_name(name)
        .map_err(|_| invalid(path, &format!("missing {name}")))?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load a sketch file, expanding page references into inline pages.
pub fn from_file(file_path: impl AsRef<Path>) -> Result<SketchFile> {
    let file_path = file_path.as_ref();
    let file = File::open(file_path)?;
    let mut zip = ZipArchive::new(file)
        .map_err(|_| invalid(file_path, "not a zip file"))?;

    let mut document = read_json(&mut zip, "document.json", file_path)?;
    let page_refs = document
        .get("pages")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| invalid(file_path, "document.json has no pages list"))?;

    let mut pages = Vec::with_capacity(page_refs.len());
    for page_ref in &page_refs {
        let reference = page_ref
            .get("_ref")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(file_path, "page entry has no _ref"))?;
        pages.push(read_json(&mut zip, &format!("{reference}.json"), file_path)?);
    }
    document["pages"] = Value::Array(pages);

    let workspace_members: Vec<String> = zip
        .file_names()
        .filter(|name| name.starts_with("workspace/") && name.ends_with(".json"))
        .map(String::from)
        .collect();
    let mut workspace = Workspace::new();
    for member in workspace_members {
        let value = read_json(&mut zip, &member, file_path)?;
        let stem = Path::new(&member)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        workspace.insert(stem, value);
    }

    let meta = read_json(&mut zip, "meta.json", file_path)?;
    let user = read_json(&mut zip, "user.json", file_path)?;
    debug!(path = %file_path.display(), pages = page_refs.len(), "read sketch file");

    Ok(SketchFile {
        filepath: file_path.to_path_buf(),
        contents: Contents {
            document,
            meta,
            user,
            workspace,
        },
    })
}

fn write_json<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: FileOptions,
    name: &str,
    value: &Value,
) -> Result<()> {
    zip.start_file(name, options)?;
    zip.write_all(serde_json::to_string(value)?.as_bytes())?;
    Ok(())
}

/// Write a sketch file, collapsing inline pages back to reference stubs.
///
/// With `keep_static_files`, every member of the previously written
/// archive whose name was not freshly produced (image assets, previews)
/// is carried over unchanged.
pub fn to_file(
    sketch: &SketchFile,
    alter_file_path: Option<&Path>,
    keep_static_files: bool,
) -> Result<()> {
    let file_path = alter_file_path.unwrap_or(&sketch.filepath);

    // Snapshot the prior archive before the writer truncates it.
    let backup: Option<(TempDir, PathBuf)> = if keep_static_files && sketch.filepath.is_file() {
        let dir = TempDir::new()?;
        let backup_path = dir.path().join("backup.sketch");
        fs::copy(&sketch.filepath, &backup_path)?;
        Some((dir, backup_path))
    } else {
        None
    };

    let pages = sketch
        .contents
        .document
        .get("pages")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| invalid(file_path, "document has no pages list"))?;

    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(file_path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut written: HashSet<String> = HashSet::new();

    let mut refs: Vec<Value> = Vec::with_capacity(pages.len());
    for page in &pages {
        let object_id = page
            .get("do_objectID")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(file_path, "page has no do_objectID"))?;
        let member = format!("pages/{object_id}.json");
        write_json(&mut zip, options, &member, page)?;
        written.insert(member);
        refs.push(serde_json::to_value(FileRef::page(object_id))?);
    }

    for (key, value) in &sketch.contents.workspace {
        let member = format!("workspace/{key}.json");
        write_json(&mut zip, options, &member, value)?;
        written.insert(member);
    }

    let mut document = sketch.contents.document.clone();
    document["pages"] = Value::Array(refs);
    write_json(&mut zip, options, "document.json", &document)?;
    written.insert("document.json".to_string());
    write_json(&mut zip, options, "user.json", &sketch.contents.user)?;
    written.insert("user.json".to_string());
    write_json(&mut zip, options, "meta.json", &sketch.contents.meta)?;
    written.insert("meta.json".to_string());

    if let Some((_dir, backup_path)) = &backup {
        let mut prior = ZipArchive::new(File::open(backup_path)?)?;
        for index in 0..prior.len() {
            let entry = prior.by_index_raw(index)?;
            if !written.contains(entry.name()) {
                zip.raw_copy_file(entry)?;
            }
        }
    }

    zip.finish()?;
    debug!(path = %file_path.display(), pages = pages.len(), "wrote sketch file");
    Ok(())
}
