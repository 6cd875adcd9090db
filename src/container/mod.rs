//! Binary asset container parsing.
//!
//! A container is a small header followed by a flat list of entries. Each
//! entry is either a texture block (atlas pixels) or an object record (name,
//! parent, transform, ordering and renderer state).
//!
//! # Layout
//!
//! ```text
//! "CHRX" | version u16 | flags u16 | entry_count u32
//! entry*: kind u8 | length u32 | payload[length]
//! ```
//!
//! All integers are little-endian. Strings are a `u16` byte length followed
//! by UTF-8.
//!
//! # Usage
//!
//! ```ignore
//! let container = AssetContainer::parse(std::fs::read("hero.chrx")?)?;
//! for entry in container.entries() {
//!     match entry? {
//!         RawEntry::Texture(block) => println!("texture {}", block.name),
//!         RawEntry::Record(record) => println!("object {}", record.name),
//!     }
//! }
//! ```

mod reader;
pub mod texture;
pub mod types;
mod writer;

use std::collections::BTreeMap;

use log::debug;

use crate::error::{CharexError, Result};
use crate::types::{Tint, Transform2D};

use reader::ByteReader;

pub use texture::{decode_texture, DecodedTexture};
pub use types::{NodeId, ObjectRecord, PixelFormat, RawEntry, SpriteRef, TextureBlock, TextureId};
pub use writer::ContainerWriter;

/// File signature.
pub const MAGIC: [u8; 4] = *b"CHRX";

/// Newest format version this build understands.
pub const FORMAT_VERSION: u16 = 2;

const HEADER_LEN: usize = 12;

const KIND_TEXTURE: u8 = 1;
const KIND_RECORD: u8 = 2;

/// A validated container. Entries are parsed on demand.
#[derive(Debug)]
pub struct AssetContainer {
    bytes: Vec<u8>,
    version: u16,
    entry_count: u32,
}

impl AssetContainer {
    /// Validate the header and take ownership of the container bytes.
    pub fn parse(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(CharexError::CorruptContainer {
                offset: Some(0),
                message: format!("header needs {} bytes, got {}", HEADER_LEN, bytes.len()),
                help: Some("Is this file an asset container?".to_string()),
            });
        }

        let mut r = ByteReader::new(&bytes, 0);
        let magic: [u8; 4] = r.array("signature")?;
        if magic != MAGIC {
            return Err(CharexError::CorruptContainer {
                offset: Some(0),
                message: format!("bad signature {:02X?}", magic),
                help: Some("Is this file an asset container?".to_string()),
            });
        }

        let version = r.u16("version")?;
        if version > FORMAT_VERSION {
            return Err(CharexError::UnsupportedVersion {
                found: version,
                supported: FORMAT_VERSION,
            });
        }
        if version == 0 {
            return Err(CharexError::corrupt(4, "version 0 is not a valid format version"));
        }

        let _flags = r.u16("flags")?;
        let entry_count = r.u32("entry count")?;

        debug!("container v{} with {} entries", version, entry_count);

        Ok(Self {
            bytes,
            version,
            entry_count,
        })
    }

    /// Format version declared by the header.
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Number of entries declared by the header.
    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }

    /// Lazily parse entries in file order.
    ///
    /// The iterator stops after the first structural error.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            reader: ByteReader::new(&self.bytes[HEADER_LEN..], HEADER_LEN as u64),
            version: self.version,
            index: 0,
            count: self.entry_count,
            failed: false,
        }
    }

    /// Parse every entry, splitting textures from records.
    pub fn read_all(&self) -> Result<ContainerContents> {
        let mut contents = ContainerContents::default();
        for entry in self.entries() {
            match entry? {
                RawEntry::Texture(block) => contents.textures.push(block),
                RawEntry::Record(record) => contents.records.push(record),
            }
        }
        Ok(contents)
    }
}

/// All entries of a container, in file order within each kind.
#[derive(Debug, Default)]
pub struct ContainerContents {
    pub textures: Vec<TextureBlock>,
    pub records: Vec<ObjectRecord>,
}

/// Lazy entry iterator returned by [`AssetContainer::entries`].
pub struct Entries<'a> {
    reader: ByteReader<'a>,
    version: u16,
    index: u32,
    count: u32,
    failed: bool,
}

impl Iterator for Entries<'_> {
    type Item = Result<RawEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.index >= self.count {
            return None;
        }

        let result = self.read_entry().map_err(|e| e.in_entry(self.index));
        self.index += 1;
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let left = self.count.saturating_sub(self.index) as usize;
        (0, Some(left))
    }
}

impl Entries<'_> {
    fn read_entry(&mut self) -> Result<RawEntry> {
        let entry_offset = self.reader.offset();
        let kind = self.reader.u8("entry kind")?;
        let length = self.reader.u32("entry length")? as usize;
        let payload_offset = self.reader.offset();
        let payload = self.reader.bytes(length, "entry payload").map_err(|_| {
            CharexError::corrupt(
                entry_offset,
                format!(
                    "declares {} payload bytes but the container ends first",
                    length
                ),
            )
        })?;

        let mut r = ByteReader::new(payload, payload_offset);
        let entry = match kind {
            KIND_TEXTURE => RawEntry::Texture(read_texture(&mut r)?),
            KIND_RECORD => RawEntry::Record(read_record(&mut r, self.version, entry_offset)?),
            other => {
                return Err(CharexError::corrupt(
                    entry_offset,
                    format!("unknown entry kind {}", other),
                ))
            }
        };

        if r.remaining() > 0 {
            debug!(
                "entry {} has {} trailing payload bytes, ignoring",
                self.index,
                r.remaining()
            );
        }

        Ok(entry)
    }
}

fn read_texture(r: &mut ByteReader<'_>) -> Result<TextureBlock> {
    let id = TextureId(r.u64("texture id")?);
    let name = r.string("texture name")?;
    let width = r.u32("texture width")?;
    let height = r.u32("texture height")?;
    let format = PixelFormat::from_code(r.u8("pixel format")?);
    let data_len = r.u32("texture data length")? as usize;
    let data = r.bytes(data_len, "texture data")?.to_vec();

    debug!("texture {} '{}' {}x{} {:?}", id, name, width, height, format);

    Ok(TextureBlock {
        id,
        name,
        width,
        height,
        format,
        data,
    })
}

/// Fails unless every value is finite; placement math assumes it.
fn finite(at: u64, what: &str, values: &[f32]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(CharexError::corrupt(at, format!("{} is not finite: {:?}", what, values)))
    }
}

fn read_record(r: &mut ByteReader<'_>, version: u16, entry_offset: u64) -> Result<ObjectRecord> {
    let id_offset = r.offset();
    let id = NodeId(r.u64("record id")?);
    if id.is_none() {
        return Err(CharexError::corrupt(id_offset, "record id 0 is reserved"));
    }
    let name = r.string("record name")?;
    let parent = NodeId(r.u64("parent id")?);
    let texture = r.u64("sprite texture id")?;
    let at = r.offset();
    let rect = r.rect("sprite rect")?;
    finite(at, "sprite rect", &[rect.x, rect.y, rect.w, rect.h])?;
    let at = r.offset();
    let pivot = r.vec2("sprite pivot")?;
    finite(at, "sprite pivot", &[pivot.x, pivot.y])?;
    let at = r.offset();
    let position = r.vec2("local position")?;
    let z = r.f32("local position")?;
    finite(at, "local position", &[position.x, position.y, z])?;
    let at = r.offset();
    let scale = r.vec2("local scale")?;
    finite(at, "local scale", &[scale.x, scale.y])?;
    let sibling_index = r.u32("sibling index")?;
    let sorting_order = r.i32("sorting order")?;
    let active = r.u8("active flag")? != 0;

    let mut color = Tint::WHITE;
    let mut extra = BTreeMap::new();
    if version >= 2 {
        let at = r.offset();
        color = Tint::new(
            r.f32("renderer color")?,
            r.f32("renderer color")?,
            r.f32("renderer color")?,
            r.f32("renderer color")?,
        );
        finite(at, "renderer color", &[color.r, color.g, color.b, color.a])?;
        let count = r.u16("property count")?;
        for _ in 0..count {
            let key = r.string("property key")?;
            let value = r.string("property value")?;
            extra.insert(key, value);
        }
    }

    let sprite = (texture != 0).then(|| SpriteRef {
        texture: TextureId(texture),
        rect,
        pivot,
    });

    Ok(ObjectRecord {
        id,
        name,
        parent: (!parent.is_none()).then_some(parent),
        sprite,
        transform: Transform2D { position, z, scale },
        sibling_index,
        sorting_order,
        active,
        color,
        extra,
        offset: Some(entry_offset),
    })
}
