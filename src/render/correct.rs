//! Colour correction for sprites exported with premultiplied alpha.
//!
//! The source pipeline premultiplies cheek sprites before export, so their
//! colour channels arrive scaled down by alpha and render too dark when
//! composited with straight alpha. Correction divides the scale back out.
//!
//! Records may also carry a renderer colour that the source engine
//! multiplies into the sprite at draw time; [`apply_tint`] bakes it in.

use std::sync::Arc;

use image::RgbaImage;

use crate::catalog::SpriteAsset;
use crate::types::Tint;

/// Return the sprite with its colour corrected if it is of the defective
/// kind; any other sprite comes back sharing the same pixel buffer.
///
/// A sprite that is already corrected is returned unchanged, so applying
/// this twice is harmless.
pub fn correct(sprite: &SpriteAsset) -> SpriteAsset {
    if sprite.corrected || !sprite.classification.is_defective() {
        return sprite.clone();
    }

    let mut out = sprite.clone();
    out.pixels = Arc::new(unpremultiply(&sprite.original));
    out.corrected = true;
    out
}

/// Return the sprite with its renderer colour multiplied into its pixels.
///
/// White leaves the sprite sharing its buffer. Runs after [`correct`], on
/// whatever pixels the sprite currently composites with.
pub fn apply_tint(sprite: &SpriteAsset) -> SpriteAsset {
    if sprite.tinted || sprite.tint.is_identity() {
        return sprite.clone();
    }

    let mut out = sprite.clone();
    out.pixels = Arc::new(tint_image(&sprite.pixels, &sprite.tint));
    out.tinted = true;
    out
}

/// Multiply every pixel by a tint into a new buffer.
pub fn tint_image(image: &RgbaImage, tint: &Tint) -> RgbaImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        px.0 = tint.apply(px.0);
    }
    out
}

/// Undo premultiplied alpha into a new buffer.
///
/// Alpha is copied unchanged. Fully transparent and fully opaque pixels
/// keep their colour bytes.
pub fn unpremultiply(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        let a = px[3];
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px.0[..3] {
            let v = (*c as u32 * 255 + a as u32 / 2) / a as u32;
            *c = v.min(255) as u8;
        }
    }
    out
}
