//! Image normalizer: decode, fit inside a bounding box, re-encode as lossless WebP.

use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageReader};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),
}

/// A normalized image ready to be written
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct ImageNormalizer {
    max_width: u32,
    max_height: u32,
}

impl ImageNormalizer {
    pub const OUTPUT_EXTENSION: &'static str = "webp";
    pub const OUTPUT_MIME_TYPE: &'static str = "image/webp";

    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width: max_width.max(1),
            max_height: max_height.max(1),
        }
    }

    /// Fit-inside target size. Never upscales and never crops; the aspect ratio
    /// is kept up to rounding.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width && height <= self.max_height {
            return (width, height);
        }

        let scale = f64::min(
            self.max_width as f64 / width as f64,
            self.max_height as f64 / height as f64,
        );
        let target_w = ((width as f64 * scale).round() as u32).clamp(1, self.max_width);
        let target_h = ((height as f64 * scale).round() as u32).clamp(1, self.max_height);
        (target_w, target_h)
    }

    /// CPU-bound; call from a blocking thread.
    pub fn normalize(&self, data: &[u8]) -> Result<NormalizedImage, ProcessingError> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let (source_width, source_height) = img.dimensions();
        let (width, height) = self.target_dimensions(source_width, source_height);

        let resized = if (width, height) == (source_width, source_height) {
            img
        } else {
            img.resize_exact(width, height, FilterType::Lanczos3)
        };

        let data = encode_lossless_webp(&resized)?;

        tracing::debug!(
            source_width,
            source_height,
            width,
            height,
            size_bytes = data.len(),
            "Image normalized"
        );

        Ok(NormalizedImage {
            data,
            width,
            height,
            source_width,
            source_height,
        })
    }
}

fn encode_lossless_webp(img: &DynamicImage) -> Result<Vec<u8>, ProcessingError> {
    let mut bytes = Vec::new();
    let encoder = WebPEncoder::new_lossless(&mut bytes);

    let result = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        encoder.encode(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
    } else {
        let rgb = img.to_rgb8();
        encoder.encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
    };

    result.map_err(|e| ProcessingError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        match format {
            ImageFormat::Jpeg => RgbImage::from_pixel(width, height, Rgb([120, 80, 40]))
                .write_to(&mut cursor, format)
                .unwrap(),
            _ => RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 200]))
                .write_to(&mut cursor, format)
                .unwrap(),
        }
        buffer
    }

    fn normalizer() -> ImageNormalizer {
        ImageNormalizer::new(1920, 1080)
    }

    #[test]
    fn test_target_dimensions_fit_inside() {
        let n = normalizer();
        assert_eq!(n.target_dimensions(3000, 2000), (1620, 1080));
        assert_eq!(n.target_dimensions(4000, 1000), (1920, 480));
        assert_eq!(n.target_dimensions(1080, 4000), (292, 1080));
        assert_eq!(n.target_dimensions(1920, 1080), (1920, 1080));
    }

    #[test]
    fn test_target_dimensions_never_upscale() {
        let n = normalizer();
        assert_eq!(n.target_dimensions(400, 300), (400, 300));
        assert_eq!(n.target_dimensions(1, 1), (1, 1));
    }

    #[test]
    fn test_target_dimensions_extreme_aspect() {
        let n = normalizer();
        let (w, h) = n.target_dimensions(100_000, 10);
        assert_eq!(w, 1920);
        assert_eq!(h, 1);
    }

    #[test]
    fn test_large_jpeg_is_scaled_to_height_bound() {
        let out = normalizer()
            .normalize(&encoded(3000, 2000, ImageFormat::Jpeg))
            .unwrap();
        assert_eq!((out.width, out.height), (1620, 1080));
        assert_eq!((out.source_width, out.source_height), (3000, 2000));

        let decoded = image::load_from_memory(&out.data).unwrap();
        assert_eq!(decoded.dimensions(), (1620, 1080));
        assert_eq!(image::guess_format(&out.data).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_small_png_is_unchanged_in_size() {
        let out = normalizer()
            .normalize(&encoded(400, 300, ImageFormat::Png))
            .unwrap();
        assert_eq!((out.width, out.height), (400, 300));
        assert_eq!(image::guess_format(&out.data).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_lossless_keeps_pixels() {
        let out = normalizer()
            .normalize(&encoded(8, 8, ImageFormat::Png))
            .unwrap();
        let decoded = image::load_from_memory(&out.data).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(3, 3), &Rgba([255, 0, 0, 200]));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = normalizer().normalize(b"this is a text file, not a picture");
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
    }
}
