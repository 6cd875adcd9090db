//! Sprite catalog: decoded, classified, colour-corrected sprites.
//!
//! The catalog is built once per container and is immutable afterwards, so
//! any number of compositions can read it concurrently.
//!
//! # Example
//!
//! ```ignore
//! let contents = AssetContainer::parse(bytes)?.read_all()?;
//! let (catalog, diagnostics) = CatalogBuilder::new().build(&contents)?;
//! for sprite in catalog.iter() {
//!     println!("{} {}", sprite.name, sprite.classification.category);
//! }
//! ```

pub mod classify;
mod sprite;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use image::imageops;
use log::{debug, warn};
use rayon::prelude::*;

use crate::container::{
    decode_texture, ContainerContents, DecodedTexture, NodeId, ObjectRecord, SpriteRef, TextureId,
};
use crate::error::{CharexError, Result};
use crate::render::{apply_tint, correct};
use crate::validation::{Diagnostic, ValidationResult};

pub use classify::{classify, Category, Classification, PartTag};
pub use sprite::SpriteAsset;

/// All sprites recovered from one container.
#[derive(Debug, Default)]
pub struct SpriteCatalog {
    sprites: HashMap<NodeId, SpriteAsset>,
    /// Sprite ids in container order.
    order: Vec<NodeId>,
    textures: BTreeMap<TextureId, DecodedTexture>,
}

impl SpriteCatalog {
    /// Get a sprite by the id of the record that places it.
    pub fn get(&self, id: NodeId) -> Option<&SpriteAsset> {
        self.sprites.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.sprites.contains_key(&id)
    }

    /// First sprite (in container order) with this exact name.
    pub fn find_by_name(&self, name: &str) -> Option<&SpriteAsset> {
        self.iter().find(|s| s.name == name)
    }

    /// Sprites in container order.
    pub fn iter(&self) -> impl Iterator<Item = &SpriteAsset> {
        self.order.iter().filter_map(|id| self.sprites.get(id))
    }

    /// Sprite ids in container order.
    pub fn ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Every successfully decoded texture, by id.
    pub fn textures(&self) -> impl Iterator<Item = &DecodedTexture> {
        self.textures.values()
    }

    pub fn texture(&self, id: TextureId) -> Option<&DecodedTexture> {
        self.textures.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

/// Builds a `SpriteCatalog` from parsed container contents.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    jobs: usize,
    correct_colours: bool,
    apply_tints: bool,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self {
            jobs: 0,
            correct_colours: true,
            apply_tints: true,
        }
    }
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of decode workers; 0 lets rayon pick.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Enable or disable colour correction of defective sprites.
    pub fn correct_colours(mut self, enabled: bool) -> Self {
        self.correct_colours = enabled;
        self
    }

    /// Multiply each record's renderer colour into its sprite, as the
    /// engine does when drawing. White records are left alone.
    pub fn apply_tints(mut self, enabled: bool) -> Self {
        self.apply_tints = enabled;
        self
    }

    /// Decode textures in parallel, then build sprites for every record that
    /// references one.
    ///
    /// Per-entry failures are returned as diagnostics; the catalog holds
    /// whatever succeeded. Only a failure to start the worker pool is an
    /// error.
    pub fn build(&self, contents: &ContainerContents) -> Result<(SpriteCatalog, ValidationResult)> {
        let mut diagnostics = ValidationResult::new();
        let mut catalog = SpriteCatalog::default();

        for result in self.decode_all(contents)? {
            match result {
                Ok(texture) => {
                    if catalog.textures.contains_key(&texture.id) {
                        continue;
                    }
                    catalog.textures.insert(texture.id, texture);
                }
                Err(err) => {
                    warn!("{}", err);
                    diagnostics.push(Diagnostic::from(&err));
                }
            }
        }

        for record in &contents.records {
            let Some(sprite_ref) = record.sprite else {
                continue;
            };

            if catalog.sprites.contains_key(&record.id) {
                // Duplicate record ids are rejected by the hierarchy builder.
                continue;
            }

            match self.build_sprite(record, &sprite_ref, &catalog.textures) {
                Ok(sprite) => {
                    debug!(
                        "sprite {} '{}' {}x{} {}/{}",
                        sprite.id,
                        sprite.name,
                        sprite.width(),
                        sprite.height(),
                        sprite.classification.category,
                        sprite.classification.tag
                    );
                    catalog.order.push(sprite.id);
                    catalog.sprites.insert(sprite.id, sprite);
                }
                Err(diagnostic) => {
                    warn!("{}", diagnostic.message);
                    diagnostics.push(diagnostic);
                }
            }
        }

        Ok((catalog, diagnostics))
    }

    fn decode_all(&self, contents: &ContainerContents) -> Result<Vec<Result<DecodedTexture>>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| CharexError::Config {
                message: format!("Failed to start decode workers: {}", e),
                help: Some("Lower the 'jobs' setting".to_string()),
            })?;

        Ok(pool.install(|| contents.textures.par_iter().map(decode_texture).collect()))
    }

    fn build_sprite(
        &self,
        record: &ObjectRecord,
        sprite_ref: &SpriteRef,
        textures: &BTreeMap<TextureId, DecodedTexture>,
    ) -> std::result::Result<SpriteAsset, Diagnostic> {
        let Some(texture) = textures.get(&sprite_ref.texture) else {
            return Err(Diagnostic::warning(
                "charex::catalog::missing-texture",
                format!(
                    "Part '{}' uses {}, which is missing or failed to decode",
                    record.name, sprite_ref.texture
                ),
            )
            .about(record.id));
        };

        let pixels = crop(texture, sprite_ref).ok_or_else(|| {
            Diagnostic::warning(
                "charex::catalog::rect-out-of-bounds",
                format!(
                    "Part '{}' rect {:?} lies outside {} ({}x{})",
                    record.name,
                    sprite_ref.rect,
                    texture.id,
                    texture.image.width(),
                    texture.image.height()
                ),
            )
            .about(record.id)
        })?;

        let mut sprite = SpriteAsset::new(
            record.id,
            record.name.clone(),
            texture.id,
            sprite_ref.rect,
            sprite_ref.pivot,
            classify(&record.name),
            pixels,
        );
        sprite.tint = record.color;

        if self.correct_colours {
            sprite = correct(&sprite);
        }
        if self.apply_tints {
            sprite = apply_tint(&sprite);
        }

        Ok(sprite)
    }
}

/// Cut a sprite's rect out of its atlas. An empty rect shares the whole
/// texture buffer.
fn crop(texture: &DecodedTexture, sprite_ref: &SpriteRef) -> Option<Arc<image::RgbaImage>> {
    let rect = sprite_ref.rect;
    if rect.is_empty() {
        return Some(Arc::clone(&texture.image));
    }

    if rect.x < 0.0 || rect.y < 0.0 {
        return None;
    }
    let x = rect.x.round() as u32;
    let y = rect.y.round() as u32;
    let w = rect.w.round().max(1.0) as u32;
    let h = rect.h.round().max(1.0) as u32;

    let (tw, th) = texture.image.dimensions();
    if x.checked_add(w)? > tw || y.checked_add(h)? > th {
        return None;
    }

    if (x, y, w, h) == (0, 0, tw, th) {
        return Some(Arc::clone(&texture.image));
    }

    Some(Arc::new(imageops::crop_imm(texture.image.as_ref(), x, y, w, h).to_image()))
}
