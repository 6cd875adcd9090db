//! Core value types for charex.
//!
//! - `Tint` - multiplicative renderer colour
//! - `Vec2`, `Rect`, `Transform2D` - container-space geometry
//! - `PixelRect` - integer rectangles in composite canvas space

mod colour;
mod geometry;

pub use colour::Tint;
pub use geometry::{PixelRect, Rect, Transform2D, Vec2};
