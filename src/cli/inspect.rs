//! Inspect command implementation.
//!
//! Prints the hierarchy tree (or JSON exports) to stdout and diagnostics to
//! stderr, without writing any files.

use std::path::PathBuf;

use clap::Args;

use crate::error::{CharexError, Result};
use crate::export::{hierarchy_text, HierarchyExport, SpriteMetadata};
use crate::extract::{extract_file, Extraction};
use crate::manifest::Manifest;
use crate::output::{plural, Printer};

use super::EngineArgs;

/// Print a container's hierarchy and diagnostics
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Container file to read
    pub container: PathBuf,

    /// Print the hierarchy and sprite exports as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn run(args: InspectArgs, manifest: &Manifest, printer: &Printer) -> Result<()> {
    let extraction = extract_file(&args.container, &args.engine.options(manifest))?;

    if args.json {
        println!("{}", render_json(&extraction)?);
    } else {
        print!("{}", hierarchy_text(&extraction.tree, &extraction.catalog));
        print_summary(&extraction, printer);
    }

    printer.diagnostics(&extraction.diagnostics);
    Ok(())
}

fn print_summary(extraction: &Extraction, printer: &Printer) {
    let tree = &extraction.tree;
    printer.info("Format", &format!("v{}", extraction.version));
    printer.info(
        "Units",
        &format!(
            "{}{}",
            plural(tree.units().len(), "unit", "units"),
            if tree.has_implicit_root() {
                printer.dim(" (grouped under an implicit root)")
            } else {
                String::new()
            }
        ),
    );
    printer.info(
        "Sprites",
        &format!(
            "{} in {}",
            plural(extraction.catalog.len(), "sprite", "sprites"),
            plural(extraction.catalog.textures().count(), "texture", "textures")
        ),
    );
}

#[derive(serde::Serialize)]
struct InspectJson {
    version: u16,
    hierarchy: HierarchyExport,
    sprites: Vec<SpriteMetadata>,
    diagnostics: crate::validation::ValidationResult,
}

fn render_json(extraction: &Extraction) -> Result<String> {
    let doc = InspectJson {
        version: extraction.version,
        hierarchy: HierarchyExport::from_tree(&extraction.tree, &extraction.catalog),
        sprites: SpriteMetadata::from_catalog(&extraction.catalog),
        diagnostics: extraction.diagnostics.clone(),
    };
    serde_json::to_string_pretty(&doc).map_err(|e| CharexError::Export {
        message: format!("Failed to serialize inspection: {}", e),
        help: None,
    })
}
