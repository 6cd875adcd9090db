//! End-to-end extraction: container bytes to catalog, tree and diagnostics.

use std::path::Path;

use log::info;

use crate::catalog::{CatalogBuilder, SpriteCatalog};
use crate::container::{AssetContainer, ContainerContents};
use crate::error::{CharexError, Result};
use crate::hierarchy::{Hierarchy, HierarchyBuilder, RootPolicy};
use crate::manifest::Manifest;
use crate::render::{Compositor, DEFAULT_RATIO};
use crate::validation::{validate_contents, ValidationResult};

/// Knobs for one extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub jobs: usize,
    pub root_policy: RootPolicy,
    pub correct_cheeks: bool,
    pub apply_tints: bool,
    pub ratio: f32,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            jobs: 0,
            root_policy: RootPolicy::default(),
            correct_cheeks: true,
            apply_tints: true,
            ratio: DEFAULT_RATIO,
        }
    }
}

impl From<&Manifest> for ExtractOptions {
    fn from(manifest: &Manifest) -> Self {
        Self {
            jobs: manifest.jobs,
            root_policy: manifest.root_policy,
            correct_cheeks: manifest.correct_cheeks,
            apply_tints: manifest.apply_tints,
            ratio: manifest.ratio,
        }
    }
}

/// Everything recovered from one container.
#[derive(Debug)]
pub struct Extraction {
    pub version: u16,
    pub catalog: SpriteCatalog,
    pub tree: Hierarchy,
    /// Per-entry failures and record warnings.
    pub diagnostics: ValidationResult,
    ratio: f32,
}

impl Extraction {
    /// A compositor over this extraction's catalog and tree.
    pub fn compositor(&self) -> Compositor<'_> {
        Compositor::new(&self.catalog, &self.tree).ratio(self.ratio)
    }
}

/// Sprites and textures recovered without resolving the hierarchy.
#[derive(Debug)]
pub struct SpriteDump {
    pub version: u16,
    pub catalog: SpriteCatalog,
    pub diagnostics: ValidationResult,
}

/// Parse, decode, classify, correct and resolve one container.
///
/// Structural problems abort with an error; per-entry problems are
/// collected in `Extraction::diagnostics`.
pub fn extract(bytes: Vec<u8>, options: &ExtractOptions) -> Result<Extraction> {
    let (version, contents) = read_contents(bytes)?;

    let tree = HierarchyBuilder::new()
        .policy(options.root_policy)
        .build(&contents.records)?;

    let (catalog, diagnostics) = build_catalog(&contents, options)?;

    info!(
        "extracted {} sprites, {} nodes, {} diagnostics",
        catalog.len(),
        tree.len(),
        diagnostics.iter().count()
    );

    Ok(Extraction {
        version,
        catalog,
        tree,
        diagnostics,
        ratio: options.ratio,
    })
}

/// Decode sprites only. Parent links are not followed, so containers whose
/// hierarchy is broken still yield their pixels.
pub fn extract_sprites(bytes: Vec<u8>, options: &ExtractOptions) -> Result<SpriteDump> {
    let (version, contents) = read_contents(bytes)?;
    let (catalog, diagnostics) = build_catalog(&contents, options)?;

    info!(
        "extracted {} sprites without hierarchy, {} diagnostics",
        catalog.len(),
        diagnostics.iter().count()
    );

    Ok(SpriteDump {
        version,
        catalog,
        diagnostics,
    })
}

/// Read a container file and extract it.
pub fn extract_file(path: &Path, options: &ExtractOptions) -> Result<Extraction> {
    extract(read_file(path)?, options)
}

/// Read a container file and extract its sprites only.
pub fn extract_sprites_file(path: &Path, options: &ExtractOptions) -> Result<SpriteDump> {
    extract_sprites(read_file(path)?, options)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| CharexError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read container: {}", e),
    })
}

fn read_contents(bytes: Vec<u8>) -> Result<(u16, ContainerContents)> {
    let container = AssetContainer::parse(bytes)?;
    let contents = container.read_all()?;
    Ok((container.version(), contents))
}

fn build_catalog(
    contents: &ContainerContents,
    options: &ExtractOptions,
) -> Result<(SpriteCatalog, ValidationResult)> {
    let (catalog, mut diagnostics) = CatalogBuilder::new()
        .jobs(options.jobs)
        .correct_colours(options.correct_cheeks)
        .apply_tints(options.apply_tints)
        .build(contents)?;
    diagnostics.merge(validate_contents(contents));
    Ok((catalog, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{ContainerWriter, NodeId, ObjectRecord, PixelFormat, TextureBlock, TextureId, FORMAT_VERSION};
    use crate::render::CompositionRequest;
    use crate::types::Rect;
    use tempfile::tempdir;

    fn texture(id: u64, data: Vec<u8>) -> TextureBlock {
        TextureBlock {
            id: TextureId(id),
            name: format!("atlas{}", id),
            width: 2,
            height: 2,
            format: PixelFormat::Rgba32,
            data,
        }
    }

    fn container() -> Vec<u8> {
        let mut writer = ContainerWriter::new(FORMAT_VERSION);
        writer
            .add_texture(texture(1, [200, 10, 10, 255].repeat(4)))
            .add_texture(texture(2, vec![1, 2, 3]))
            .add_record(ObjectRecord::new(1, "Body").with_sprite(1, Rect::default()))
            .add_record(ObjectRecord::new(2, "Hair").with_parent(1).with_sprite(2, Rect::default()))
            .add_record(ObjectRecord::new(3, "Pet").with_sprite(1, Rect::default()));
        writer.to_bytes().unwrap()
    }

    #[test]
    fn test_extract_recovers_from_bad_texture() {
        let extraction = extract(container(), &ExtractOptions::default()).unwrap();

        assert_eq!(extraction.version, FORMAT_VERSION);
        assert_eq!(extraction.catalog.len(), 2);
        assert!(extraction.tree.has_implicit_root());
        assert_eq!(extraction.diagnostics.error_count(), 1);

        let out = extraction
            .compositor()
            .compose(CompositionRequest::new().select(NodeId(1)))
            .unwrap();
        assert_eq!(out.image.get_pixel(0, 0).0, [200, 10, 10, 255]);
        assert!(extraction
            .compositor()
            .compose(CompositionRequest::new().select(NodeId(2)))
            .is_err());
    }

    #[test]
    fn test_extract_honours_root_policy() {
        let options = ExtractOptions {
            root_policy: RootPolicy::RequireSingle,
            ..Default::default()
        };
        let err = extract(container(), &options).unwrap_err();
        assert!(matches!(err, CharexError::MultipleRoots { .. }));
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let err = extract(b"not a container".to_vec(), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CharexError::CorruptContainer { .. }));
    }

    #[test]
    fn test_extract_file_missing() {
        let dir = tempdir().unwrap();
        let err = extract_file(&dir.path().join("nope.chrx"), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, CharexError::Io { .. }));
    }

    #[test]
    fn test_sprites_survive_broken_hierarchy() {
        let mut writer = ContainerWriter::new(FORMAT_VERSION);
        writer
            .add_texture(texture(1, [200, 10, 10, 255].repeat(4)))
            .add_record(ObjectRecord::new(1, "Body").with_parent(2).with_sprite(1, Rect::default()))
            .add_record(ObjectRecord::new(2, "Face").with_parent(1).with_sprite(1, Rect::default()))
            .add_record(ObjectRecord::new(3, "Hat").with_parent(99).with_sprite(1, Rect::default()));
        let bytes = writer.to_bytes().unwrap();

        assert!(extract(bytes.clone(), &ExtractOptions::default()).is_err());

        let dump = extract_sprites(bytes, &ExtractOptions::default()).unwrap();
        assert_eq!(dump.version, FORMAT_VERSION);
        assert_eq!(dump.catalog.ids(), &[NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn test_options_from_manifest() {
        let manifest =
            Manifest::parse("jobs: 3\ncorrect_cheeks: false\napply_tints: false\nratio: 50").unwrap();
        let options = ExtractOptions::from(&manifest);
        assert_eq!(options.jobs, 3);
        assert!(!options.correct_cheeks);
        assert!(!options.apply_tints);
        assert_eq!(options.ratio, 50.0);
    }
}
