//! Raw entry types yielded by the container parser.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::types::{Rect, Tint, Transform2D, Vec2};

/// Identifier a metadata record declares for itself.
///
/// `NodeId(0)` never appears on a record; on the wire it means "none", and
/// the hierarchy uses it for the synthesized root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    pub const NONE: Self = NodeId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier a texture block declares for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TextureId(pub u64);

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tex#{}", self.0)
    }
}

/// Pixel layout of a texture block's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba32,
    Argb32,
    Rgb24,
    Alpha8,
    /// Payload is a complete PNG file.
    Png,
    /// A format code this version of charex does not know.
    Unknown(u8),
}

impl PixelFormat {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => PixelFormat::Rgba32,
            2 => PixelFormat::Argb32,
            3 => PixelFormat::Rgb24,
            4 => PixelFormat::Alpha8,
            5 => PixelFormat::Png,
            other => PixelFormat::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            PixelFormat::Rgba32 => 1,
            PixelFormat::Argb32 => 2,
            PixelFormat::Rgb24 => 3,
            PixelFormat::Alpha8 => 4,
            PixelFormat::Png => 5,
            PixelFormat::Unknown(code) => code,
        }
    }

    /// Bytes per pixel for raw formats; `None` for encoded or unknown ones.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Rgba32 | PixelFormat::Argb32 => Some(4),
            PixelFormat::Rgb24 => Some(3),
            PixelFormat::Alpha8 => Some(1),
            PixelFormat::Png | PixelFormat::Unknown(_) => None,
        }
    }
}

/// A texture (atlas) block, not yet decoded.
#[derive(Debug, Clone)]
pub struct TextureBlock {
    pub id: TextureId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

/// Where a record's sprite lives inside a texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRef {
    pub texture: TextureId,
    /// Source rect inside the atlas; empty means the whole texture.
    pub rect: Rect,
    /// Normalized pivot, origin bottom-left.
    pub pivot: Vec2,
}

/// One object's metadata: name, placement, ordering, renderer state.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    pub id: NodeId,
    pub name: String,
    pub parent: Option<NodeId>,
    pub sprite: Option<SpriteRef>,
    pub transform: Transform2D,
    pub sibling_index: u32,
    pub sorting_order: i32,
    pub active: bool,
    pub color: Tint,
    /// Properties the format does not give a typed field.
    pub extra: BTreeMap<String, String>,
    /// Byte offset of the entry this record was parsed from.
    pub offset: Option<u64>,
}

impl ObjectRecord {
    /// A record with defaults, useful for building containers by hand.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: NodeId(id),
            name: name.into(),
            parent: None,
            sprite: None,
            transform: Transform2D::IDENTITY,
            sibling_index: 0,
            sorting_order: 0,
            active: true,
            color: Tint::WHITE,
            extra: BTreeMap::new(),
            offset: None,
        }
    }

    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = Some(NodeId(parent));
        self
    }

    pub fn with_sprite(mut self, texture: u64, rect: Rect) -> Self {
        self.sprite = Some(SpriteRef {
            texture: TextureId(texture),
            rect,
            pivot: Vec2::new(0.5, 0.5),
        });
        self
    }

    pub fn with_pivot(mut self, x: f32, y: f32) -> Self {
        if let Some(sprite) = &mut self.sprite {
            sprite.pivot = Vec2::new(x, y);
        }
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.transform.position = Vec2::new(x, y);
        self
    }

    pub fn with_order(mut self, sorting_order: i32) -> Self {
        self.sorting_order = sorting_order;
        self
    }

    pub fn with_sibling_index(mut self, index: u32) -> Self {
        self.sibling_index = index;
        self
    }
}

/// A single entry from the container, in file order.
#[derive(Debug, Clone)]
pub enum RawEntry {
    Texture(TextureBlock),
    Record(ObjectRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_format_codes_round_trip() {
        for code in 1..=5 {
            assert_eq!(PixelFormat::from_code(code).code(), code);
        }
        assert_eq!(PixelFormat::from_code(99), PixelFormat::Unknown(99));
    }

    #[test]
    fn test_record_builder() {
        let record = ObjectRecord::new(7, "Face")
            .with_parent(1)
            .with_sprite(100, Rect::new(0.0, 0.0, 8.0, 8.0))
            .with_pivot(0.5, 0.0)
            .with_order(3);

        assert_eq!(record.parent, Some(NodeId(1)));
        assert_eq!(record.sorting_order, 3);
        let sprite = record.sprite.unwrap();
        assert_eq!(sprite.texture, TextureId(100));
        assert_eq!(sprite.pivot, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(12).to_string(), "#12");
        assert!(NodeId::NONE.is_none());
    }
}
