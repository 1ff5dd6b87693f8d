//! Sketch typegen CLI
//!
//! Fetches the schema package from the registry and generates the typed
//! data-model module.

use std::path::PathBuf;

use clap::Parser;
use sketch_document::config::GeneratorConfig;
use sketch_document::{codegen, fetch, schemas};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sketch-typegen")]
#[command(about = "Generate the typed Sketch data model from the published JSON schemas")]
struct Cli {
    /// Output path for the generated module (defaults to the configured
    /// path, types.py)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Schema version: a dist-tag or an exact version of the schema
    /// package
    #[arg(short, long, default_value = "latest")]
    version: String,

    /// Path to an explicit config file
    #[arg(short, long)]
    config: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = GeneratorConfig::load_from(cli.config.as_deref())?;
    let out = cli.out.unwrap_or_else(|| config.output.path.clone());

    let package = fetch::fetch_package(&config.registry.url, &config.registry.package)?;
    let unpacked = fetch::download_tarball(&package, &cli.version)?;
    let bundle = schemas::load_bundle(unpacked.path())?;

    let module = codegen::generate_to_path(&out, &bundle)?;
    println!(
        "Generated {} ({} declarations, schema version {})",
        out.display(),
        module.declaration_count,
        bundle.version
    );
    Ok(())
}
