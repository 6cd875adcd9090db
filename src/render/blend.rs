//! Straight-alpha source-over compositing.

use image::{Rgba, RgbaImage};

/// Porter-Duff "source over" for straight (non-premultiplied) alpha.
///
/// A source pixel over a fully transparent destination is returned as-is,
/// colour bytes included, so painting onto an empty canvas is lossless.
pub fn source_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    match (src[3], dst[3]) {
        (0, _) => return dst,
        (255, _) | (_, 0) => return src,
        _ => {}
    }

    let src_alpha = src[3] as f32 / 255.0;
    let dst_alpha = dst[3] as f32 / 255.0;

    // out_alpha = src_alpha + dst_alpha * (1 - src_alpha)
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

    let channel = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let out = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (out.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Paint `sprite` onto `canvas` with its top-left corner at `(left, top)`.
/// Pixels falling outside the canvas are clipped.
pub fn paint(canvas: &mut RgbaImage, sprite: &RgbaImage, left: i64, top: i64) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);

    for (sx, sy, src) in sprite.enumerate_pixels() {
        let x = left + sx as i64;
        let y = top + sy as i64;
        if x < 0 || y < 0 || x >= cw || y >= ch {
            continue;
        }
        let dst = canvas.get_pixel_mut(x as u32, y as u32);
        *dst = source_over(*src, *dst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_transparent_is_verbatim() {
        let src = Rgba([12, 34, 56, 78]);
        assert_eq!(source_over(src, Rgba([0, 0, 0, 0])), src);
        assert_eq!(source_over(src, Rgba([255, 255, 255, 0])), src);
    }

    #[test]
    fn test_transparent_source_keeps_destination() {
        let dst = Rgba([10, 20, 30, 200]);
        assert_eq!(source_over(Rgba([255, 0, 0, 0]), dst), dst);
    }

    #[test]
    fn test_opaque_source_replaces() {
        let src = Rgba([255, 0, 0, 255]);
        assert_eq!(source_over(src, Rgba([0, 0, 255, 255])), src);
    }

    #[test]
    fn test_half_red_over_blue() {
        let out = source_over(Rgba([255, 0, 0, 128]), Rgba([0, 0, 255, 255]));
        assert_eq!(out[3], 255);
        assert!((out[0] as i32 - 128).abs() <= 1);
        assert!((out[2] as i32 - 127).abs() <= 1);
    }

    #[test]
    fn test_paint_clips_to_canvas() {
        let mut canvas = RgbaImage::new(2, 2);
        let sprite = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));

        paint(&mut canvas, &sprite, 1, -1);

        assert_eq!(canvas.get_pixel(1, 0).0, [9, 9, 9, 255]);
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(canvas.get_pixel(1, 1).0, [0, 0, 0, 0]);
    }
}
