//! Composition of selected sprites into one image.
//!
//! # Example
//!
//! ```ignore
//! let request = CompositionRequest::new()
//!     .select_many([NodeId(1), NodeId(2), NodeId(3)])
//!     .with_depth(NodeId(3), -1);
//! let composite = Compositor::new(&catalog, &tree).compose(request)?;
//! write_png(&composite.image, Path::new("hero.png"), 1)?;
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use image::RgbaImage;
use log::debug;

use crate::catalog::{SpriteAsset, SpriteCatalog};
use crate::container::NodeId;
use crate::error::{CharexError, Result};
use crate::hierarchy::{DepthKey, Hierarchy};
use crate::types::{PixelRect, Tint};

use super::blend::paint;
use super::correct::tint_image;

/// Pixels per container unit used by the source engine.
pub const DEFAULT_RATIO: f32 = 100.0;

/// Largest canvas a composition may allocate, in pixels.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Placed sprites must land within this many pixels of the origin.
const MAX_COORDINATE: f64 = (1u64 << 40) as f64;

/// Which sprites a request paints: explicit ids, plus every active sprite
/// when `all_active` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub ids: BTreeSet<NodeId>,
    pub all_active: bool,
}

/// An immutable description of one composition.
///
/// Built with chained methods and passed by value to
/// [`Compositor::compose`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionRequest {
    selection: Selection,
    depth_overrides: BTreeMap<NodeId, i32>,
    tints: BTreeMap<NodeId, Tint>,
}

impl CompositionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sprite to the selection. Selecting twice has no effect.
    pub fn select(self, id: NodeId) -> Self {
        self.select_many([id])
    }

    pub fn select_many(mut self, ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.selection.ids.extend(ids);
        self
    }

    /// Paint every active sprite, along with anything selected explicitly.
    pub fn select_all(mut self) -> Self {
        self.selection.all_active = true;
        self
    }

    /// Replace the sprite's layer when ordering.
    pub fn with_depth(mut self, id: NodeId, layer: i32) -> Self {
        self.depth_overrides.insert(id, layer);
        self
    }

    /// Multiply the sprite by a tint before painting.
    pub fn with_tint(mut self, id: NodeId, tint: Tint) -> Self {
        self.tints.insert(id, tint);
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn depth_overrides(&self) -> &BTreeMap<NodeId, i32> {
        &self.depth_overrides
    }
}

/// A finished composition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeImage {
    pub image: RgbaImage,
    /// Canvas position in the shared pixel space (+y down).
    pub bounds: PixelRect,
    /// Node ids in the order they were painted, back to front.
    pub paint_order: Vec<NodeId>,
}

impl CompositeImage {
    fn empty() -> Self {
        Self {
            image: RgbaImage::new(0, 0),
            bounds: PixelRect::default(),
            paint_order: Vec::new(),
        }
    }
}

/// Paints selections from a built catalog and tree.
///
/// Holds only shared references, so one compositor (or many) can serve
/// concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct Compositor<'a> {
    catalog: &'a SpriteCatalog,
    tree: &'a Hierarchy,
    ratio: f32,
}

struct Placed<'a> {
    sprite: &'a SpriteAsset,
    key: DepthKey,
    rect: PixelRect,
}

impl<'a> Compositor<'a> {
    pub fn new(catalog: &'a SpriteCatalog, tree: &'a Hierarchy) -> Self {
        Self {
            catalog,
            tree,
            ratio: DEFAULT_RATIO,
        }
    }

    /// Pixels per container unit.
    pub fn ratio(mut self, ratio: f32) -> Self {
        self.ratio = ratio;
        self
    }

    /// Where a sprite lands in the shared pixel space.
    ///
    /// Grouping nodes and ids outside the catalog are `UnknownSpriteId`.
    pub fn placement(&self, id: NodeId) -> Result<PixelRect> {
        let (sprite, node) = match (self.catalog.get(id), self.tree.get(id)) {
            (Some(sprite), Some(node)) => (sprite, node),
            _ => return Err(CharexError::UnknownSpriteId { id }),
        };
        let (w, h) = (sprite.width() as f64, sprite.height() as f64);
        let ratio = self.ratio as f64;

        // Container space is +y up; pixel space is +y down.
        let x = node.world.position.x as f64 * ratio;
        let y = -(node.world.position.y as f64) * ratio;
        let left = (x - sprite.pivot.x as f64 * w).floor();
        let top = (y - (1.0 - sprite.pivot.y as f64) * h).floor();

        for (axis, value) in [("x", left), ("y", top)] {
            if !value.is_finite() || value.abs() > MAX_COORDINATE {
                return Err(CharexError::Placement {
                    id,
                    message: format!("{} offset {} is out of range", axis, value),
                });
            }
        }

        Ok(PixelRect {
            left: left as i64,
            top: top as i64,
            width: sprite.width(),
            height: sprite.height(),
        })
    }

    pub fn compose(&self, request: CompositionRequest) -> Result<CompositeImage> {
        for id in request.depth_overrides.keys().chain(request.tints.keys()) {
            self.require(*id)?;
        }

        let mut ids = request.selection.ids.clone();
        if request.selection.all_active {
            ids.extend(
                self.catalog
                    .ids()
                    .iter()
                    .copied()
                    .filter(|id| self.tree.get(*id).is_some_and(|n| n.active)),
            );
        }

        let mut placed = Vec::with_capacity(ids.len());
        for id in ids {
            let (sprite, rect) = self.require(id)?;
            let key = match (self.tree.depth_key(id), request.depth_overrides.get(&id)) {
                (Some(key), Some(&layer)) => key.with_layer(layer),
                (Some(key), None) => key.clone(),
                (None, _) => return Err(CharexError::UnknownSpriteId { id }),
            };
            placed.push(Placed { sprite, key, rect });
        }

        if placed.is_empty() {
            return Ok(CompositeImage::empty());
        }

        placed.sort_by(|a, b| a.key.cmp(&b.key));

        let bounds = canvas_bounds(placed.iter().map(|p| &p.rect))?;

        let mut image = RgbaImage::new(bounds.width, bounds.height);
        let mut paint_order = Vec::with_capacity(placed.len());

        for p in &placed {
            let pixels = tinted(p.sprite, request.tints.get(&p.sprite.id));
            paint(
                &mut image,
                &pixels,
                p.rect.left - bounds.left,
                p.rect.top - bounds.top,
            );
            paint_order.push(p.sprite.id);
        }

        debug!(
            "composed {} sprites into {}x{}",
            paint_order.len(),
            bounds.width,
            bounds.height
        );

        Ok(CompositeImage {
            image,
            bounds,
            paint_order,
        })
    }

    /// Look up a paintable sprite; grouping nodes count as absent.
    fn require(&self, id: NodeId) -> Result<(&'a SpriteAsset, PixelRect)> {
        let rect = self.placement(id)?;
        let sprite = self
            .catalog
            .get(id)
            .ok_or(CharexError::UnknownSpriteId { id })?;
        Ok((sprite, rect))
    }
}

/// Smallest canvas covering every rect, refusing ones too large to allocate.
fn canvas_bounds<'r>(mut rects: impl Iterator<Item = &'r PixelRect>) -> Result<PixelRect> {
    let mut bounds = match rects.next() {
        Some(first) => *first,
        None => return Ok(PixelRect::default()),
    };
    for rect in rects {
        bounds = bounds.union(rect).ok_or_else(|| too_large(&bounds, rect))?;
    }

    let pixels = u64::from(bounds.width) * u64::from(bounds.height);
    if pixels > MAX_CANVAS_PIXELS {
        return Err(CharexError::CanvasTooLarge {
            width: bounds.width.into(),
            height: bounds.height.into(),
            limit: MAX_CANVAS_PIXELS,
        });
    }
    Ok(bounds)
}

fn too_large(a: &PixelRect, b: &PixelRect) -> CharexError {
    let span = |lo: i64, hi: i64| hi.saturating_sub(lo).max(0) as u64;
    CharexError::CanvasTooLarge {
        width: span(a.left.min(b.left), a.right().max(b.right())),
        height: span(a.top.min(b.top), a.bottom().max(b.bottom())),
        limit: MAX_CANVAS_PIXELS,
    }
}

fn tinted<'s>(sprite: &'s SpriteAsset, tint: Option<&Tint>) -> Cow<'s, RgbaImage> {
    match tint {
        Some(tint) if !tint.is_identity() => Cow::Owned(tint_image(sprite.pixels(), tint)),
        _ => Cow::Borrowed(sprite.pixels()),
    }
}
