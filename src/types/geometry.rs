//! Small geometry types shared by the parser, hierarchy and compositor.

use serde::Serialize;

/// A 2D vector in container units (not pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in atlas pixel coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// A rect with no area means "the whole texture".
    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

/// Local transform of a node relative to its parent.
///
/// Only the 2D part of the source transform is kept; `z` is carried for
/// export but never affects placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform2D {
    pub position: Vec2,
    pub z: f32,
    pub scale: Vec2,
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        z: 0.0,
        scale: Vec2::ONE,
    };

    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::IDENTITY
        }
    }

    /// Compose this local transform under a parent's world transform.
    pub fn under(&self, parent: &Transform2D) -> Transform2D {
        Transform2D {
            position: Vec2::new(
                parent.position.x + parent.scale.x * self.position.x,
                parent.position.y + parent.scale.y * self.position.y,
            ),
            z: parent.z + self.z,
            scale: Vec2::new(parent.scale.x * self.scale.x, parent.scale.y * self.scale.y),
        }
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// An integer pixel rectangle in the shared canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub left: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn right(&self) -> i64 {
        self.left.saturating_add(i64::from(self.width))
    }

    pub fn bottom(&self) -> i64 {
        self.top.saturating_add(i64::from(self.height))
    }

    /// Smallest rect containing both, or `None` if a side exceeds `u32`.
    pub fn union(&self, other: &PixelRect) -> Option<PixelRect> {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Some(PixelRect {
            left,
            top,
            width: u32::try_from(right.checked_sub(left)?).ok()?,
            height: u32::try_from(bottom.checked_sub(top)?).ok()?,
        })
    }
}
