//! Image decoding, JPEG encoding and resampling
//!
//! The compressor is written against the [`ImageCodec`] trait so the search
//! logic can be tested without real pixels. [`RasterCodec`] is the production
//! implementation backed by the `image` crate.

use crate::types::{DecodeError, ReportError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};

/// Lossy encoding quality in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quality(f32);

impl Quality {
    /// Create a quality value, clamping into `0.0..=1.0`
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1..=100 scale used by JPEG encoders
    pub fn percent(self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(1, 100)
    }
}

/// Decode, encode and resample operations used by the compressor.
///
/// Implementations must be thread-safe: compression runs on blocking worker
/// threads, several photos at a time.
pub trait ImageCodec: Send + Sync + 'static {
    /// Decoded raster the codec operates on
    type Surface: Clone + Send + 'static;

    /// Parse an encoded image (any supported format)
    fn decode(&self, bytes: &[u8]) -> std::result::Result<Self::Surface, DecodeError>;

    /// Pixel dimensions as (width, height)
    fn dimensions(&self, surface: &Self::Surface) -> (u32, u32);

    /// Resize to exactly `width` × `height`; aspect ratio is the caller's concern
    fn resample(&self, surface: &Self::Surface, width: u32, height: u32) -> Self::Surface;

    /// Encode as JPEG. Higher quality gives larger output.
    fn encode_jpeg(&self, surface: &Self::Surface, quality: Quality) -> Result<Vec<u8>>;
}

// =============================================================================
// image crate backend
// =============================================================================

/// Codec backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec {
    filter: Option<FilterType>,
}

impl RasterCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different resampling filter (default: Triangle)
    pub fn with_filter(filter: FilterType) -> Self {
        Self {
            filter: Some(filter),
        }
    }
}

impl ImageCodec for RasterCodec {
    type Surface = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> std::result::Result<DynamicImage, DecodeError> {
        image::load_from_memory(bytes).map_err(|e| DecodeError::new(e.to_string()))
    }

    fn dimensions(&self, surface: &DynamicImage) -> (u32, u32) {
        (surface.width(), surface.height())
    }

    fn resample(&self, surface: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        surface.resize_exact(
            width.max(1),
            height.max(1),
            self.filter.unwrap_or(FilterType::Triangle),
        )
    }

    fn encode_jpeg(&self, surface: &DynamicImage, quality: Quality) -> Result<Vec<u8>> {
        let rgb = flatten_on_white(surface);
        let mut buf = Vec::new();
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.percent());
        encoder
            .encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| ReportError::Encode(e.to_string()))?;
        Ok(buf)
    }
}

/// Composite onto a white page; JPEG has no alpha channel
fn flatten_on_white(surface: &DynamicImage) -> RgbImage {
    if !surface.color().has_alpha() {
        return surface.to_rgb8();
    }
    let rgba = surface.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u16;
        let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

// =============================================================================
// Test codec
// =============================================================================

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;

    const MAGIC: &[u8; 4] = b"MOCK";

    /// Raster stand-in carrying only its dimensions
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct MockSurface {
        pub width: u32,
        pub height: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode,
        Resample { width: u32, height: u32 },
        Encode { width: u32, height: u32, quality: f32 },
    }

    /// Codec whose encoded size is a pure function of dimensions and quality.
    ///
    /// Encoded output is decodable by the same codec, so results can be
    /// compressed again.
    pub struct MockCodec {
        size_fn: fn(u32, u32, f32) -> usize,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    /// Bytes per pixel grows with the square of quality
    pub fn photo_like_size(width: u32, height: u32, quality: f32) -> usize {
        let pixels = width as f64 * height as f64;
        let q = quality as f64;
        (pixels * (0.1 + 1.9 * q * q)) as usize
    }

    impl MockCodec {
        pub fn new() -> Self {
            Self::with_size_fn(photo_like_size)
        }

        pub fn with_size_fn(size_fn: fn(u32, u32, f32) -> usize) -> Self {
            Self {
                size_fn,
                operations: Mutex::new(Vec::new()),
            }
        }

        /// Encoded bytes of a mock image with the given dimensions
        pub fn image_bytes(width: u32, height: u32) -> Vec<u8> {
            let mut bytes = MAGIC.to_vec();
            bytes.extend_from_slice(&width.to_le_bytes());
            bytes.extend_from_slice(&height.to_le_bytes());
            bytes
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn encode_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Encode { .. }))
                .count()
        }
    }

    impl ImageCodec for MockCodec {
        type Surface = MockSurface;

        fn decode(&self, bytes: &[u8]) -> std::result::Result<MockSurface, DecodeError> {
            self.operations.lock().unwrap().push(RecordedOp::Decode);
            if bytes.len() < 12 || &bytes[..4] != MAGIC {
                return Err(DecodeError::new("not a mock image"));
            }
            let width = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
            let height = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            if width == 0 || height == 0 {
                return Err(DecodeError::new("zero-sized mock image"));
            }
            Ok(MockSurface { width, height })
        }

        fn dimensions(&self, surface: &MockSurface) -> (u32, u32) {
            (surface.width, surface.height)
        }

        fn resample(&self, _surface: &MockSurface, width: u32, height: u32) -> MockSurface {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Resample { width, height });
            MockSurface { width, height }
        }

        fn encode_jpeg(&self, surface: &MockSurface, quality: Quality) -> Result<Vec<u8>> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                width: surface.width,
                height: surface.height,
                quality: quality.value(),
            });
            let size = (self.size_fn)(surface.width, surface.height, quality.value()).max(12);
            let mut bytes = Self::image_bytes(surface.width, surface.height);
            bytes.resize(size, 0);
            Ok(bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_quality_clamps() {
        assert_eq!(Quality::new(1.5).value(), 1.0);
        assert_eq!(Quality::new(-0.2).value(), 0.0);
        assert_eq!(Quality::new(f32::NAN).value(), 0.0);
        assert_eq!(Quality::new(0.9).percent(), 90);
        assert_eq!(Quality::new(0.0).percent(), 1);
    }

    #[test]
    fn test_decode_png() {
        let codec = RasterCodec::new();
        let surface = codec.decode(&png_bytes(&gradient(64, 32))).unwrap();
        assert_eq!(codec.dimensions(&surface), (64, 32));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let codec = RasterCodec::new();
        let err = codec.decode(b"definitely not an image").unwrap_err();
        assert!(!err.reason.is_empty());
    }

    #[test]
    fn test_encode_produces_jpeg() {
        let codec = RasterCodec::new();
        let bytes = codec
            .encode_jpeg(&gradient(48, 48), Quality::new(0.8))
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(codec.dimensions(&decoded), (48, 48));
    }

    #[test]
    fn test_encode_flattens_alpha() {
        let codec = RasterCodec::new();
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 0])));
        assert!(codec.encode_jpeg(&rgba, Quality::new(0.5)).is_ok());
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let mut rgba = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        let flat = flatten_on_white(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(flat.get_pixel(1, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_higher_quality_is_larger() {
        let codec = RasterCodec::new();
        let image = gradient(128, 128);
        let low = codec.encode_jpeg(&image, Quality::new(0.3)).unwrap();
        let high = codec.encode_jpeg(&image, Quality::new(0.95)).unwrap();
        assert!(high.len() > low.len());
    }

    #[test]
    fn test_resample_exact() {
        let codec = RasterCodec::new();
        let resized = codec.resample(&gradient(100, 50), 40, 30);
        assert_eq!(codec.dimensions(&resized), (40, 30));
    }
}
