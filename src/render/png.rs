//! PNG output for composites and extracted sprites.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::{CharexError, Result};

/// Write an image to a PNG file.
///
/// # Arguments
///
/// * `image` - Pixels to write
/// * `path` - Output file path
/// * `scale` - Integer scale factor (1 = no scaling)
pub fn write_png(image: &RgbaImage, path: &Path, scale: u32) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CharexError::Export {
            message: format!("Nothing to write to {}: the image is empty", path.display()),
            help: Some("Select at least one sprite".to_string()),
        });
    }

    let scaled = scale_pixels(image, scale);

    scaled.save(path).map_err(|e| CharexError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write PNG: {}", e),
    })?;

    Ok(())
}

/// Scale an image by an integer factor.
///
/// Uses nearest-neighbour scaling so hard sprite edges stay hard.
pub fn scale_pixels(image: &RgbaImage, scale: u32) -> RgbaImage {
    if scale <= 1 {
        return image.clone();
    }
    imageops::resize(
        image,
        image.width() * scale,
        image.height() * scale,
        FilterType::Nearest,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn checker() -> RgbaImage {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 128]));
        img
    }

    #[test]
    fn test_write_png_round_trips_pixels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.png");

        write_png(&checker(), &path, 1).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img, checker());
    }

    #[test]
    fn test_write_png_scaled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scaled.png");

        write_png(&checker(), &path, 2).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(2, 0).0, [0, 255, 0, 128]);
    }

    #[test]
    fn test_scale_zero_treated_as_one() {
        assert_eq!(scale_pixels(&checker(), 0), checker());
    }

    #[test]
    fn test_empty_image_is_export_error() {
        let dir = tempdir().unwrap();
        let err = write_png(&RgbaImage::new(0, 0), &dir.path().join("e.png"), 1).unwrap_err();
        assert!(matches!(err, CharexError::Export { .. }));
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let err = write_png(&checker(), &path, 1).unwrap_err();
        assert!(matches!(err, CharexError::Io { .. }));
    }
}
