//! Extract command implementation.
//!
//! Writes every sprite and texture as PNG, plus hierarchy and sprite
//! metadata exports.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::catalog::SpriteCatalog;
use crate::error::{CharexError, Result};
use crate::export::{
    hierarchy_text, write_json, write_sprite_pngs, write_texture_pngs, HierarchyExport,
    SpriteMetadata,
};
use crate::extract::{extract_file, extract_sprites_file};
use crate::manifest::Manifest;
use crate::output::{display_path, plural, Printer};

use super::EngineArgs;

/// Extract sprites, textures and hierarchy exports from a container
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Container file to read
    pub container: PathBuf,

    /// Output directory (default: manifest output)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Only write sprite and texture PNGs; the hierarchy is not resolved
    #[arg(long)]
    pub sprites_only: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn run(args: ExtractArgs, manifest: &Manifest, printer: &Printer) -> Result<()> {
    let options = args.engine.options(manifest);
    let out_dir = args.output.clone().unwrap_or_else(|| manifest.output.clone());

    printer.status("Reading", &display_path(&args.container));

    if args.sprites_only {
        // The hierarchy is never resolved, so broken parent links do not
        // stop the pixel dump.
        let dump = extract_sprites_file(&args.container, &options)?;
        printer.diagnostics(&dump.diagnostics);
        write_pngs(&dump.catalog, &out_dir, printer)?;
        printer.success("Finished", &display_path(&out_dir));
        return Ok(());
    }

    let extraction = extract_file(&args.container, &options)?;
    printer.diagnostics(&extraction.diagnostics);
    write_pngs(&extraction.catalog, &out_dir, printer)?;

    write_json(
        &HierarchyExport::from_tree(&extraction.tree, &extraction.catalog),
        &out_dir.join("hierarchy.json"),
    )?;
    write_json(
        &SpriteMetadata::from_catalog(&extraction.catalog),
        &out_dir.join("sprites.json"),
    )?;

    let text_path = out_dir.join("hierarchy.txt");
    fs::write(&text_path, hierarchy_text(&extraction.tree, &extraction.catalog)).map_err(|e| {
        CharexError::Io {
            path: text_path.clone(),
            message: format!("Failed to write hierarchy: {}", e),
        }
    })?;
    printer.status(
        "Exported",
        &format!("hierarchy ({})", plural(extraction.tree.len(), "node", "nodes")),
    );

    printer.success("Finished", &display_path(&out_dir));
    Ok(())
}

fn write_pngs(catalog: &SpriteCatalog, out_dir: &Path, printer: &Printer) -> Result<()> {
    let textures = write_texture_pngs(catalog, &out_dir.join("textures"))?;
    let sprites = write_sprite_pngs(catalog, &out_dir.join("sprites"))?;
    printer.wrote(out_dir, textures.len(), sprites.len());
    Ok(())
}
