//! Sprite asset type.

use std::sync::Arc;

use image::RgbaImage;

use crate::container::{NodeId, TextureId};
use crate::types::{Rect, Tint, Vec2};

use super::classify::Classification;

/// One placed sprite: pixels plus what is needed to position and label it.
///
/// Pixel buffers are shared and never written to. When colour correction or
/// the renderer colour applies, `pixels` is a new buffer and `original`
/// keeps the decoded one.
#[derive(Debug, Clone)]
pub struct SpriteAsset {
    pub id: NodeId,
    pub name: String,
    pub texture: TextureId,
    pub rect: Rect,
    pub pivot: Vec2,
    pub classification: Classification,
    /// Renderer colour declared by the record.
    pub tint: Tint,
    pub(crate) pixels: Arc<RgbaImage>,
    pub(crate) original: Arc<RgbaImage>,
    pub(crate) corrected: bool,
    pub(crate) tinted: bool,
}

impl SpriteAsset {
    /// Build an uncorrected sprite around a decoded buffer.
    pub fn new(
        id: NodeId,
        name: impl Into<String>,
        texture: TextureId,
        rect: Rect,
        pivot: Vec2,
        classification: Classification,
        pixels: Arc<RgbaImage>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            texture,
            rect,
            pivot,
            classification,
            tint: Tint::WHITE,
            original: Arc::clone(&pixels),
            pixels,
            corrected: false,
            tinted: false,
        }
    }

    /// Pixels used for compositing (corrected when applicable).
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Pixels exactly as decoded from the container.
    pub fn original_pixels(&self) -> &RgbaImage {
        &self.original
    }

    /// Whether colour correction replaced this sprite's pixels.
    pub fn is_corrected(&self) -> bool {
        self.corrected
    }

    /// Whether the renderer colour was multiplied into `pixels`.
    pub fn is_tinted(&self) -> bool {
        self.tinted
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}
