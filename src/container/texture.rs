//! Texture block decoding.
//!
//! Every supported pixel format is expanded to straight-alpha RGBA8.

use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::error::{CharexError, Result};

use super::types::{PixelFormat, TextureBlock, TextureId};

/// A texture block decoded to RGBA.
#[derive(Debug, Clone)]
pub struct DecodedTexture {
    pub id: TextureId,
    pub name: String,
    pub image: Arc<RgbaImage>,
}

/// Decode one texture block.
///
/// Failures are specific to this block; callers are expected to record them
/// and carry on with the remaining entries.
pub fn decode_texture(block: &TextureBlock) -> Result<DecodedTexture> {
    let fail = |message: String| CharexError::TextureDecode {
        texture: block.id,
        name: block.name.clone(),
        message,
    };

    if block.width == 0 || block.height == 0 {
        return Err(fail(format!(
            "declared size {}x{} has no pixels",
            block.width, block.height
        )));
    }

    let image = match block.format {
        PixelFormat::Png => {
            let decoded = image::load_from_memory_with_format(&block.data, ImageFormat::Png)
                .map_err(|e| fail(format!("invalid PNG payload: {}", e)))?
                .to_rgba8();
            if decoded.dimensions() != (block.width, block.height) {
                return Err(fail(format!(
                    "PNG is {}x{} but the block declares {}x{}",
                    decoded.width(),
                    decoded.height(),
                    block.width,
                    block.height
                )));
            }
            decoded
        }
        PixelFormat::Unknown(code) => {
            return Err(fail(format!("unsupported pixel format code {}", code)));
        }
        raw => {
            let bpp = raw.bytes_per_pixel().unwrap_or(4);
            let expected = (block.width as usize)
                .checked_mul(block.height as usize)
                .and_then(|n| n.checked_mul(bpp))
                .ok_or_else(|| fail("declared size overflows".to_string()))?;
            if block.data.len() != expected {
                return Err(fail(format!(
                    "{:?} {}x{} needs {} bytes, block has {}",
                    raw,
                    block.width,
                    block.height,
                    expected,
                    block.data.len()
                )));
            }
            let rgba = expand_to_rgba(raw, &block.data);
            RgbaImage::from_raw(block.width, block.height, rgba)
                .ok_or_else(|| fail("pixel buffer does not match dimensions".to_string()))?
        }
    };

    Ok(DecodedTexture {
        id: block.id,
        name: block.name.clone(),
        image: Arc::new(image),
    })
}

fn expand_to_rgba(format: PixelFormat, data: &[u8]) -> Vec<u8> {
    match format {
        PixelFormat::Rgba32 => data.to_vec(),
        PixelFormat::Argb32 => data
            .chunks_exact(4)
            .flat_map(|p| [p[1], p[2], p[3], p[0]])
            .collect(),
        PixelFormat::Rgb24 => data
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        PixelFormat::Alpha8 => data.iter().flat_map(|&a| [255, 255, 255, a]).collect(),
        PixelFormat::Png | PixelFormat::Unknown(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn block(format: PixelFormat, width: u32, height: u32, data: Vec<u8>) -> TextureBlock {
        TextureBlock {
            id: TextureId(9),
            name: "atlas".to_string(),
            width,
            height,
            format,
            data,
        }
    }

    #[test]
    fn test_decode_rgba32() {
        let tex = decode_texture(&block(PixelFormat::Rgba32, 1, 1, vec![1, 2, 3, 4])).unwrap();
        assert_eq!(tex.image.get_pixel(0, 0).0, [1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_argb32_reorders() {
        let tex = decode_texture(&block(PixelFormat::Argb32, 1, 1, vec![4, 1, 2, 3])).unwrap();
        assert_eq!(tex.image.get_pixel(0, 0).0, [1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_rgb24_is_opaque() {
        let tex = decode_texture(&block(PixelFormat::Rgb24, 2, 1, vec![9, 8, 7, 6, 5, 4])).unwrap();
        assert_eq!(tex.image.get_pixel(1, 0).0, [6, 5, 4, 255]);
    }

    #[test]
    fn test_decode_alpha8_is_white() {
        let tex = decode_texture(&block(PixelFormat::Alpha8, 1, 1, vec![77])).unwrap();
        assert_eq!(tex.image.get_pixel(0, 0).0, [255, 255, 255, 77]);
    }

    #[test]
    fn test_decode_png_payload() {
        let src = RgbaImage::from_raw(2, 1, vec![10, 20, 30, 255, 0, 0, 0, 0]).unwrap();
        let mut png = Vec::new();
        src.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).unwrap();

        let tex = decode_texture(&block(PixelFormat::Png, 2, 1, png)).unwrap();
        assert_eq!(*tex.image, src);
    }

    #[test]
    fn test_length_mismatch_is_decode_error() {
        let err = decode_texture(&block(PixelFormat::Rgba32, 2, 2, vec![0; 15])).unwrap_err();
        match err {
            CharexError::TextureDecode { texture, message, .. } => {
                assert_eq!(texture, TextureId(9));
                assert!(message.contains("needs 16 bytes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_format_is_decode_error() {
        let err = decode_texture(&block(PixelFormat::Unknown(42), 1, 1, vec![0])).unwrap_err();
        assert!(matches!(err, CharexError::TextureDecode { .. }));
    }

    #[test]
    fn test_garbage_png_is_decode_error() {
        let err = decode_texture(&block(PixelFormat::Png, 1, 1, vec![1, 2, 3])).unwrap_err();
        assert!(matches!(err, CharexError::TextureDecode { .. }));
    }

    #[test]
    fn test_zero_size_is_decode_error() {
        let err = decode_texture(&block(PixelFormat::Rgba32, 0, 4, vec![])).unwrap_err();
        assert!(matches!(err, CharexError::TextureDecode { .. }));
    }
}
