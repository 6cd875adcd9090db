//! Container serialization.
//!
//! Produces the same layout `AssetContainer::parse` reads. Used to build
//! fixtures and to repack edited containers.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{CharexError, Result};

use super::types::{ObjectRecord, RawEntry, TextureBlock};
use super::{KIND_RECORD, KIND_TEXTURE, MAGIC};

/// Accumulates entries and writes them as one container.
#[derive(Debug, Clone)]
pub struct ContainerWriter {
    version: u16,
    entries: Vec<RawEntry>,
}

impl ContainerWriter {
    /// Create a writer targeting a format version (1 or 2).
    pub fn new(version: u16) -> Self {
        Self {
            version,
            entries: Vec::new(),
        }
    }

    pub fn add_texture(&mut self, block: TextureBlock) -> &mut Self {
        self.entries.push(RawEntry::Texture(block));
        self
    }

    pub fn add_record(&mut self, record: ObjectRecord) -> &mut Self {
        self.entries.push(RawEntry::Record(record));
        self
    }

    /// Serialize header and entries.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.write_all(&MAGIC)?;
        out.write_u16::<LittleEndian>(self.version)?;
        out.write_u16::<LittleEndian>(0)?;
        out.write_u32::<LittleEndian>(self.entries.len() as u32)?;

        for entry in &self.entries {
            let (kind, payload) = match entry {
                RawEntry::Texture(block) => (KIND_TEXTURE, texture_payload(block)?),
                RawEntry::Record(record) => (KIND_RECORD, record_payload(record, self.version)?),
            };
            out.write_u8(kind)?;
            out.write_u32::<LittleEndian>(payload.len() as u32)?;
            out.write_all(&payload)?;
        }

        Ok(out)
    }
}

fn write_string(out: &mut Vec<u8>, s: &str) -> Result<()> {
    let len = u16::try_from(s.len()).map_err(|_| CharexError::Export {
        message: format!(
            "string '{}...' is longer than {} bytes",
            s.chars().take(16).collect::<String>(),
            u16::MAX
        ),
        help: None,
    })?;
    out.write_u16::<LittleEndian>(len)?;
    out.write_all(s.as_bytes())?;
    Ok(())
}

fn texture_payload(block: &TextureBlock) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(block.data.len() + 32);
    out.write_u64::<LittleEndian>(block.id.0)?;
    write_string(&mut out, &block.name)?;
    out.write_u32::<LittleEndian>(block.width)?;
    out.write_u32::<LittleEndian>(block.height)?;
    out.write_u8(block.format.code())?;
    out.write_u32::<LittleEndian>(block.data.len() as u32)?;
    out.write_all(&block.data)?;
    Ok(out)
}

fn record_payload(record: &ObjectRecord, version: u16) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.write_u64::<LittleEndian>(record.id.0)?;
    write_string(&mut out, &record.name)?;
    out.write_u64::<LittleEndian>(record.parent.map_or(0, |p| p.0))?;

    match &record.sprite {
        Some(sprite) => {
            out.write_u64::<LittleEndian>(sprite.texture.0)?;
            for v in [sprite.rect.x, sprite.rect.y, sprite.rect.w, sprite.rect.h] {
                out.write_f32::<LittleEndian>(v)?;
            }
            out.write_f32::<LittleEndian>(sprite.pivot.x)?;
            out.write_f32::<LittleEndian>(sprite.pivot.y)?;
        }
        None => {
            out.write_u64::<LittleEndian>(0)?;
            for _ in 0..6 {
                out.write_f32::<LittleEndian>(0.0)?;
            }
        }
    }

    let t = &record.transform;
    for v in [t.position.x, t.position.y, t.z, t.scale.x, t.scale.y] {
        out.write_f32::<LittleEndian>(v)?;
    }
    out.write_u32::<LittleEndian>(record.sibling_index)?;
    out.write_i32::<LittleEndian>(record.sorting_order)?;
    out.write_u8(record.active as u8)?;

    if version >= 2 {
        let c = &record.color;
        for v in [c.r, c.g, c.b, c.a] {
            out.write_f32::<LittleEndian>(v)?;
        }
        out.write_u16::<LittleEndian>(record.extra.len() as u16)?;
        for (key, value) in &record.extra {
            write_string(&mut out, key)?;
            write_string(&mut out, value)?;
        }
    }

    Ok(out)
}
