//! Hierarchy and sprite metadata exports.
//!
//! Exports are plain serde structs written as pretty JSON, plus a text tree
//! for terminals. Sprite and texture PNG dumps live here too.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::catalog::{classify, Category, PartTag, SpriteCatalog};
use crate::container::{NodeId, TextureId};
use crate::error::{CharexError, Result};
use crate::hierarchy::{DepthKey, Hierarchy};
use crate::render::write_png;
use crate::types::{Rect, Vec2};

/// The resolved tree, one entry per node in pre-order.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyExport {
    pub root: NodeId,
    pub units: Vec<NodeId>,
    pub nodes: Vec<NodeExport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeExport {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,
    /// Printable form of `depth`, e.g. `1@0.0/0.1`.
    pub order: String,
    pub depth: DepthKey,
    pub category: Category,
    pub tag: PartTag,
    pub position: Vec2,
    pub scale: Vec2,
    pub has_sprite: bool,
    pub active: bool,
}

/// Per-sprite metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SpriteMetadata {
    pub id: NodeId,
    pub name: String,
    pub texture: TextureId,
    pub category: Category,
    pub tag: PartTag,
    pub rect: Rect,
    pub pivot: Vec2,
    pub width: u32,
    pub height: u32,
    /// Renderer tint as `#RRGGBBAA`.
    pub tint: String,
    pub corrected: bool,
    /// Whether `tint` was multiplied into the exported pixels.
    pub tinted: bool,
}

impl HierarchyExport {
    pub fn from_tree(tree: &Hierarchy, catalog: &SpriteCatalog) -> Self {
        let nodes = tree
            .iter()
            .map(|node| {
                let classification = catalog
                    .get(node.id)
                    .map(|s| s.classification)
                    .unwrap_or_else(|| classify(&node.name));
                NodeExport {
                    id: node.id,
                    parent: node.parent,
                    name: node.name.clone(),
                    order: node.depth.to_string(),
                    depth: node.depth.clone(),
                    category: classification.category,
                    tag: classification.tag,
                    position: node.world.position,
                    scale: node.world.scale,
                    has_sprite: node.has_sprite,
                    active: node.active,
                }
            })
            .collect();

        Self {
            root: tree.root().id,
            units: tree.units(),
            nodes,
        }
    }
}

impl SpriteMetadata {
    pub fn from_catalog(catalog: &SpriteCatalog) -> Vec<Self> {
        catalog
            .iter()
            .map(|s| SpriteMetadata {
                id: s.id,
                name: s.name.clone(),
                texture: s.texture,
                category: s.classification.category,
                tag: s.classification.tag,
                rect: s.rect,
                pivot: s.pivot,
                width: s.width(),
                height: s.height(),
                tint: s.tint.to_string(),
                corrected: s.is_corrected(),
                tinted: s.is_tinted(),
            })
            .collect()
    }
}

/// Serialize a value as pretty JSON to a file.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CharexError::Export {
        message: format!("Failed to serialize {}: {}", path.display(), e),
        help: None,
    })?;
    fs::write(path, json).map_err(|e| CharexError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write JSON: {}", e),
    })?;
    Ok(())
}

/// Render the tree as indented text, one node per line.
///
/// ```text
/// Body #1 [character/body 8x8]
///   Face #2 layer 1 [character/head 4x4]
/// ```
pub fn hierarchy_text(tree: &Hierarchy, catalog: &SpriteCatalog) -> String {
    let mut out = String::new();

    for node in tree.iter() {
        let _ = write!(
            out,
            "{}{} {}",
            "  ".repeat(node.depth.level()),
            node.name,
            node.id
        );
        if node.sorting_order != 0 {
            let _ = write!(out, " layer {}", node.sorting_order);
        }
        if let Some(sprite) = catalog.get(node.id) {
            let c = sprite.classification;
            let _ = write!(
                out,
                " [{}/{} {}x{}]",
                c.category,
                c.tag,
                sprite.width(),
                sprite.height()
            );
            if sprite.is_corrected() {
                out.push_str(" corrected");
            }
            if sprite.is_tinted() {
                let _ = write!(out, " tinted {}", sprite.tint);
            }
        }
        if !node.active {
            out.push_str(" (inactive)");
        }
        out.push('\n');
    }

    out
}

/// Write every sprite as `<id>_<name>.png` into `dir`.
pub fn write_sprite_pngs(catalog: &SpriteCatalog, dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;
    catalog
        .iter()
        .map(|s| {
            let path = dir.join(format!("{}_{}.png", s.id.0, file_stem(&s.name)));
            write_png(s.pixels(), &path, 1).map(|_| path)
        })
        .collect()
}

/// Write every decoded texture as `tex<id>_<name>.png` into `dir`.
pub fn write_texture_pngs(catalog: &SpriteCatalog, dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;
    catalog
        .textures()
        .map(|t| {
            let path = dir.join(format!("tex{}_{}.png", t.id.0, file_stem(&t.name)));
            write_png(&t.image, &path, 1).map(|_| path)
        })
        .collect()
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| CharexError::Io {
        path: dir.to_path_buf(),
        message: format!("Failed to create output directory: {}", e),
    })
}

/// Make a record name safe to use in a file name.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use crate::container::{ContainerContents, ObjectRecord, PixelFormat, TextureBlock};
    use crate::hierarchy::HierarchyBuilder;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn solid(id: u64, name: &str, size: u32, px: [u8; 4]) -> TextureBlock {
        TextureBlock {
            id: TextureId(id),
            name: name.to_string(),
            width: size,
            height: size,
            format: PixelFormat::Rgba32,
            data: px.repeat((size * size) as usize),
        }
    }

    fn contents() -> ContainerContents {
        let mut cape = ObjectRecord::new(4, "Cape/Back").with_parent(1);
        cape.active = false;

        ContainerContents {
            textures: vec![
                solid(1, "body", 8, [255, 0, 0, 255]),
                solid(2, "face", 4, [0, 255, 0, 255]),
                solid(3, "cheek", 2, [50, 50, 50, 128]),
            ],
            records: vec![
                ObjectRecord::new(1, "Body").with_sprite(1, Rect::default()),
                ObjectRecord::new(2, "Face")
                    .with_parent(1)
                    .with_sprite(2, Rect::default())
                    .with_order(1)
                    .at(0.0, 0.25),
                ObjectRecord::new(3, "Cheek")
                    .with_parent(2)
                    .with_sprite(3, Rect::default())
                    .with_order(2),
                cape,
            ],
        }
    }

    fn build() -> (SpriteCatalog, Hierarchy) {
        let contents = contents();
        let (catalog, _) = CatalogBuilder::new().build(&contents).unwrap();
        let tree = HierarchyBuilder::new().build(&contents.records).unwrap();
        (catalog, tree)
    }

    #[test]
    fn test_hierarchy_text() {
        let (catalog, tree) = build();
        insta::assert_snapshot!(hierarchy_text(&tree, &catalog), @r###"
        Body #1 [character/body 8x8]
          Face #2 layer 1 [character/head 4x4]
            Cheek #3 layer 2 [character/cheek 2x2] corrected
          Cape/Back #4 (inactive)
        "###);
    }

    #[test]
    fn test_hierarchy_export() {
        let (catalog, tree) = build();
        let export = HierarchyExport::from_tree(&tree, &catalog);

        assert_eq!(export.root, NodeId(1));
        assert_eq!(export.units, vec![NodeId(1)]);
        let ids: Vec<_> = export.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4)]);

        let face = &export.nodes[1];
        assert_eq!(face.parent, Some(NodeId(1)));
        assert_eq!(face.order, "1@0.0/0.1");
        assert_eq!(face.position, Vec2::new(0.0, 0.25));

        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["nodes"][2]["category"], "character_part");
        assert_eq!(value["nodes"][2]["tag"], "cheek");
        assert_eq!(value["nodes"][0]["parent"], serde_json::Value::Null);
        assert_eq!(value["nodes"][1]["depth"]["layer"], 1);
    }

    #[test]
    fn test_sprite_metadata() {
        let (catalog, _) = build();
        let meta = SpriteMetadata::from_catalog(&catalog);

        assert_eq!(meta.len(), 3);
        assert_eq!(meta[2].name, "Cheek");
        assert!(meta[2].corrected);
        assert_eq!(meta[0].tint, "#FFFFFFFF");
        assert_eq!((meta[1].width, meta[1].height), (4, 4));

        let value = serde_json::to_value(&meta[0]).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["texture"], 1);
        assert_eq!(value["pivot"]["x"], 0.5);
    }

    #[test]
    fn test_write_json() {
        let (catalog, _) = build();
        let dir = tempdir().unwrap();
        let path = dir.path().join("sprites.json");

        write_json(&SpriteMetadata::from_catalog(&catalog), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().map(|a| a.len()), Some(3));
    }

    #[test]
    fn test_write_sprite_and_texture_pngs() {
        let (catalog, _) = build();
        let dir = tempdir().unwrap();

        let sprites = write_sprite_pngs(&catalog, &dir.path().join("sprites")).unwrap();
        assert_eq!(sprites.len(), 3);
        assert!(sprites[0].ends_with("1_Body.png"));
        assert!(sprites.iter().all(|p| p.exists()));

        let cheek = image::open(&sprites[2]).unwrap().to_rgba8();
        assert_eq!(cheek.get_pixel(0, 0).0, [100, 100, 100, 128]);

        let textures = write_texture_pngs(&catalog, &dir.path().join("textures")).unwrap();
        assert_eq!(textures.len(), 3);
        assert!(textures[0].ends_with("tex1_body.png"));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Cape/Back"), "Cape_Back");
        assert_eq!(file_stem(""), "unnamed");
    }
}
