//! charex - Character sprite extraction and compositing
//!
//! A library for reading packed asset containers, recovering the sprites
//! and part hierarchy they hold, and recomposing chosen parts into a single
//! layered image.

pub mod catalog;
pub mod cli;
pub mod container;
pub mod error;
pub mod export;
pub mod extract;
pub mod hierarchy;
pub mod manifest;
pub mod output;
pub mod render;
pub mod types;
pub mod validation;

pub use catalog::{classify, CatalogBuilder, Category, Classification, PartTag, SpriteAsset, SpriteCatalog};
pub use container::{AssetContainer, ContainerContents, ContainerWriter, NodeId, ObjectRecord, RawEntry, TextureId};
pub use error::{CharexError, Result};
pub use export::{hierarchy_text, write_json, HierarchyExport, SpriteMetadata};
pub use extract::{extract, extract_file, extract_sprites, extract_sprites_file, ExtractOptions, Extraction, SpriteDump};
pub use hierarchy::{DepthKey, Hierarchy, HierarchyBuilder, HierarchyNode, RootPolicy};
pub use manifest::Manifest;
pub use render::{apply_tint, correct, write_png, CompositeImage, CompositionRequest, Compositor};
pub use types::{PixelRect, Rect, Tint, Transform2D, Vec2};
pub use validation::{validate_contents, Diagnostic, Severity, ValidationResult};
