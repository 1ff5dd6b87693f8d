//! Sketch Document Toolkit
//!
//! Generates the typed data model for Sketch documents from the JSON
//! Schemas published in the `@sketch-hq/sketch-file-format` npm package,
//! and reads/writes the `.sketch` zip container.
//!
//! ## Features
//!
//! - **Schema-driven codegen**: classes, enums and aliases synthesized
//!   from the document, fileFormat, meta and user schemas
//! - **Polymorphic decoding**: a `_class` discriminator table wired into
//!   every heterogeneous container field
//! - **Deterministic output**: identical schemas produce byte-identical
//!   source
//! - **Container I/O**: page references expanded on read, collapsed on
//!   write; workspace members and static files preserved
//!
//! ## Architecture
//!
//! ```text
//! registry fetch (fetch) ──> schema bundle (schemas)
//!                                  │
//!                                  v
//!                    codegen pipeline (codegen::generate_module)
//!        classify ─> builder ─> decoders ─> python renderer
//!                                  │
//!                                  v
//!                            types.py (one file)
//!
//! .sketch zip  <── file::to_file / file::from_file ──>  SketchFile
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod fetch;
pub mod file;
pub mod schemas;

pub use codegen::{generate_module, generate_to_path, GeneratedModule, ModelBuilder};
pub use config::GeneratorConfig;
pub use error::{Result, SketchError};
pub use fetch::{download_tarball, fetch_package, Package, UnpackedPackage};
pub use file::{from_file, to_file, Contents, FileRef, SketchFile, Workspace};
pub use schemas::{fetch_bundle, load_bundle, SchemaBundle};
