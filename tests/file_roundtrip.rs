//! Sketch file round-trip tests

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde_json::{json, Value};
use sketch_document::file::{from_file, to_file, Contents, SketchFile, Workspace};
use sketch_document::SketchError;
use zip::write::FileOptions;
use zip::ZipWriter;

const PAGE_ONE_ID: &str = "628bbfa8-404c-48d5-95b0-3316c1e39fb0";
const PAGE_TWO_ID: &str = "d1ffdd39-4d43-41f7-9cab-b68c82c91c4e";

fn page(object_id: &str, name: &str, first_layer: Value) -> Value {
    json!({
        "_class": "page",
        "do_objectID": object_id,
        "name": name,
        "layers": [first_layer]
    })
}

fn sample_contents() -> Contents {
    let mut workspace = Workspace::new();
    workspace.insert("one".to_string(), json!("string"));
    workspace.insert("two".to_string(), json!([1, 2, 3]));
    workspace.insert(
        "three".to_string(),
        json!({"a": true, "b": ["foo", "bar", "baz"]}),
    );
    Contents {
        document: json!({
            "_class": "document",
            "do_objectID": "0377C8BC-E3EC-40BF-A3D9-65812526D041",
            "pages": [
                page(PAGE_ONE_ID, "Page 1", json!({"_class": "rectangle", "x": 1})),
                page(PAGE_TWO_ID, "Page 2", json!({"_class": "text", "stringValue": "hi"}))
            ]
        }),
        meta: json!({"version": 136, "appVersion": "72"}),
        user: json!({"document": {"pageListHeight": 87.5}}),
        workspace,
    }
}

#[test]
fn test_write_then_read_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("generated-file.sketch");
    let sketch = SketchFile::new(&path, sample_contents());

    to_file(&sketch, None, false).unwrap();
    assert!(path.exists());

    let read = from_file(&path).unwrap();
    let pages = read.contents.document["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["do_objectID"], PAGE_ONE_ID);
    assert_eq!(pages[1]["do_objectID"], PAGE_TWO_ID);
    assert_eq!(pages[0]["layers"][0]["_class"], "rectangle");
    assert_eq!(pages[1]["layers"][0]["stringValue"], "hi");

    assert_eq!(read.contents.document["_class"], "document");
    assert_eq!(read.contents.meta["version"], 136);
    assert_eq!(read.contents.user["document"]["pageListHeight"], 87.5);

    assert_eq!(read.contents.workspace.len(), 3);
    assert_eq!(read.contents.workspace["one"], json!("string"));
    assert_eq!(read.contents.workspace["two"][1], 2);
    assert_eq!(read.contents.workspace["three"]["a"], true);
}

#[test]
fn test_written_document_collapses_page_refs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collapsed.sketch");
    let sketch = SketchFile::new(&path, sample_contents());
    to_file(&sketch, None, false).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let document: Value =
        serde_json::from_reader(zip.by_name("document.json").unwrap()).unwrap();
    let refs = document["pages"].as_array().unwrap();
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0]["_class"], "MSJSONFileReference");
    assert_eq!(refs[0]["_ref_class"], "MSImmutablePage");
    assert_eq!(refs[0]["_ref"], format!("pages/{PAGE_ONE_ID}"));
    assert!(zip.by_name(&format!("pages/{PAGE_TWO_ID}.json")).is_ok());
}

#[test]
fn test_alter_file_path_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("original.sketch");
    let altered = dir.path().join("nested/deeply/altered.sketch");
    let sketch = SketchFile::new(&original, sample_contents());
    to_file(&sketch, Some(&altered), false).unwrap();
    assert!(altered.exists());
    assert!(!original.exists());
}

#[test]
fn test_keep_static_files_preserves_unknown_members() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("with-preview.sketch");
    write_archive_with_preview(&path);

    let sketch = from_file(&path).unwrap();
    to_file(&sketch, None, true).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let mut preview = Vec::new();
    std::io::Read::read_to_end(
        &mut zip.by_name("previews/preview.png").unwrap(),
        &mut preview,
    )
    .unwrap();
    assert_eq!(preview, b"not really a png");
    // Freshly written members win over the prior archive's copies.
    let document: Value =
        serde_json::from_reader(zip.by_name("document.json").unwrap()).unwrap();
    assert_eq!(document["pages"].as_array().unwrap().len(), 1);
}

#[test]
fn test_without_keep_static_files_drops_unknown_members() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-preview.sketch");
    write_archive_with_preview(&path);

    let sketch = from_file(&path).unwrap();
    to_file(&sketch, None, false).unwrap();

    let mut zip = zip::ZipArchive::new(File::open(&path).unwrap()).unwrap();
    assert!(zip.by_name("previews/preview.png").is_err());
}

#[test]
fn test_not_a_zip_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.sketch");
    fs::write(&path, "not an archive").unwrap();
    let err = from_file(&path).unwrap_err();
    assert!(matches!(err, SketchError::InvalidSketchFile(_)));
}

#[test]
fn test_missing_page_member_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dangling.sketch");
    let file = File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();
    start_json(&mut zip, options, "document.json", &json!({
        "pages": [{
            "_class": "MSJSONFileReference",
            "_ref_class": "MSImmutablePage",
            "_ref": "pages/missing"
        }]
    }));
    start_json(&mut zip, options, "meta.json", &json!({}));
    start_json(&mut zip, options, "user.json", &json!({}));
    zip.finish().unwrap();

    let err = from_file(&path).unwrap_err();
    assert!(matches!(err, SketchError::InvalidSketchFile(_)));
}

#[test]
fn test_document_without_pages_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pageless.sketch");
    let file = File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();
    start_json(&mut zip, options, "document.json", &json!({"_class": "document"}));
    start_json(&mut zip, options, "meta.json", &json!({}));
    start_json(&mut zip, options, "user.json", &json!({}));
    zip.finish().unwrap();

    let err = from_file(&path).unwrap_err();
    assert!(matches!(err, SketchError::InvalidSketchFile(_)));
}

fn start_json<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    options: FileOptions,
    name: &str,
    value: &Value,
) {
    zip.start_file(name, options).unwrap();
    zip.write_all(serde_json::to_string(value).unwrap().as_bytes())
        .unwrap();
}

/// Hand-build a minimal archive with one page and a static preview image.
fn write_archive_with_preview(path: &Path) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();
    start_json(&mut zip, options, "document.json", &json!({
        "_class": "document",
        "pages": [{
            "_class": "MSJSONFileReference",
            "_ref_class": "MSImmutablePage",
            "_ref": format!("pages/{PAGE_ONE_ID}")
        }]
    }));
    start_json(
        &mut zip,
        options,
        &format!("pages/{PAGE_ONE_ID}.json"),
        &page(PAGE_ONE_ID, "Page 1", json!({"_class": "oval"})),
    );
    start_json(&mut zip, options, "meta.json", &json!({"version": 136}));
    start_json(&mut zip, options, "user.json", &json!({}));
    start_json(&mut zip, options, "workspace/assistants.json", &json!({"dependencies": [1, 2]}));
    zip.start_file("previews/preview.png", options).unwrap();
    zip.write_all(b"not really a png").unwrap();
    zip.finish().unwrap();
}
