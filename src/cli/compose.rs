//! Compose command implementation.
//!
//! Selects sprites by id or name, applies depth and tint overrides, and
//! writes the composite as a PNG.

use std::path::PathBuf;

use clap::Args;

use crate::catalog::SpriteCatalog;
use crate::container::NodeId;
use crate::error::{CharexError, Result};
use crate::extract::extract_file;
use crate::manifest::Manifest;
use crate::output::{display_path, plural, Printer};
use crate::render::{write_png, CompositionRequest};
use crate::types::Tint;

use super::EngineArgs;

/// Compose selected sprites into one PNG
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Container file to read
    pub container: PathBuf,

    /// Sprite to include, by id or exact name (repeatable)
    #[arg(long, short, required_unless_present = "all")]
    pub select: Vec<String>,

    /// Include every active sprite
    #[arg(long)]
    pub all: bool,

    /// Depth override as <sprite>=<layer>, e.g. 12=-1 (repeatable)
    #[arg(long, allow_hyphen_values = true)]
    pub depth: Vec<String>,

    /// Tint override as <sprite>=#RRGGBB[AA] (repeatable)
    #[arg(long)]
    pub tint: Vec<String>,

    /// Output PNG (default: <output>/<container>.png)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Integer upscale factor
    #[arg(long)]
    pub scale: Option<u32>,

    /// Pixels per container unit (default: manifest, then 100)
    #[arg(long)]
    pub ratio: Option<f32>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn run(args: ComposeArgs, manifest: &Manifest, printer: &Printer) -> Result<()> {
    let mut options = args.engine.options(manifest);
    if let Some(ratio) = args.ratio {
        options.ratio = ratio;
    }

    printer.status("Reading", &display_path(&args.container));
    let extraction = extract_file(&args.container, &options)?;
    printer.diagnostics(&extraction.diagnostics);

    let request = build_request(&args, &extraction.catalog)?;
    let composite = extraction.compositor().compose(request)?;

    let output = args.output.clone().unwrap_or_else(|| {
        let stem = args
            .container
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "composite".to_string());
        manifest.output.join(format!("{}.png", stem))
    });
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CharexError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    let scale = args.scale.unwrap_or_else(|| manifest.effective_scale());
    write_png(&composite.image, &output, scale)?;

    printer.paint_order(&composite.paint_order);
    printer.success(
        "Composed",
        &format!(
            "{} ({}, {}x{})",
            display_path(&output),
            plural(composite.paint_order.len(), "sprite", "sprites"),
            composite.image.width(),
            composite.image.height()
        ),
    );

    Ok(())
}

fn build_request(args: &ComposeArgs, catalog: &SpriteCatalog) -> Result<CompositionRequest> {
    let mut request = CompositionRequest::new();

    if args.all {
        request = request.select_all();
    }
    for selector in &args.select {
        request = request.select(resolve(selector, catalog)?);
    }
    for entry in &args.depth {
        let (id, value) = split_override(entry, catalog)?;
        let layer = value.parse::<i32>().map_err(|_| CharexError::Config {
            message: format!("Invalid depth '{}' in '{}'", value, entry),
            help: Some("Depth layers are whole numbers, e.g. 12=-1".to_string()),
        })?;
        request = request.with_depth(id, layer);
    }
    for entry in &args.tint {
        let (id, value) = split_override(entry, catalog)?;
        request = request.with_tint(id, Tint::from_hex(value)?);
    }

    Ok(request)
}

/// A numeric selector is an id; anything else is looked up by name.
fn resolve(selector: &str, catalog: &SpriteCatalog) -> Result<NodeId> {
    if let Ok(id) = selector.parse::<u64>() {
        return Ok(NodeId(id));
    }
    catalog
        .find_by_name(selector)
        .map(|s| s.id)
        .ok_or_else(|| CharexError::Config {
            message: format!("No sprite named '{}'", selector),
            help: Some("Run `charex inspect` to list sprite names and ids".to_string()),
        })
}

fn split_override<'s>(entry: &'s str, catalog: &SpriteCatalog) -> Result<(NodeId, &'s str)> {
    let (selector, value) = entry.rsplit_once('=').ok_or_else(|| CharexError::Config {
        message: format!("Expected <sprite>=<value>, got '{}'", entry),
        help: None,
    })?;
    Ok((resolve(selector.trim(), catalog)?, value.trim()))
}
