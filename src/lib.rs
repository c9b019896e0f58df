//! Face redaction: pixelate detected faces or cover them with alpha-blended
//! overlay stickers.
//!
//! # Example
//!
//! ```no_run
//! use pixelface::{Effect, FaceRedactor, FaceBounds, FaceLocator};
//!
//! struct MyLocator;
//! impl FaceLocator for MyLocator {
//!     fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
//!         // Your detection logic here
//!         vec![]
//!     }
//! }
//!
//! let raw_bytes = std::fs::read("photo.jpg").unwrap();
//! let result = FaceRedactor::new(raw_bytes)
//!     .unwrap()
//!     .effect(Effect::Pixelate)
//!     .face_locator(Box::new(MyLocator))
//!     .process()
//!     .unwrap();
//! println!("redacted {} of {} faces", result.regions_rendered, result.faces_detected);
//! ```
#![warn(missing_docs)]

/// Overlay assets and the startup-built asset registry.
pub mod assets;
/// Region compositor: alpha-blending overlays onto head regions.
pub mod compositor;
mod error;
/// Face detection traits and data types.
pub mod face_locator;
/// Pure placement and clipping arithmetic.
pub mod geometry;
/// Blocky per-region redaction.
pub mod pixelate;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face locator backend.
pub mod rustface_backend;
/// Explicit fixed-size worker pool.
pub mod worker_pool;

use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Error type returned by pixelface operations.
pub use error::RedactError;
/// Overlay asset types.
pub use assets::{AssetRegistry, OverlayAsset};
/// Face locator trait and face bounding-box type.
pub use face_locator::{FaceBounds, FaceLocator};
/// Head box and overlay placement parameters.
pub use geometry::{HeadBox, OverlayStyle};
#[cfg(feature = "rustface")]
/// Built-in locator that loads a SeetaFace model from disk.
pub use rustface_backend::RustfaceLocator;
/// Worker pool and its default size.
pub use worker_pool::{WorkerPool, DEFAULT_WORKERS};

/// Default expansion applied to raw detector boxes to cover the full head.
pub const DEFAULT_HEAD_SCALE: f64 = 1.5;

/// Default pixelation block factor (roughly 3% linear resolution).
pub const DEFAULT_BLOCK_FACTOR: f32 = 0.03;

/// Default JPEG quality for encoded output.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Overlay width relative to head width for the Liotta effect.
const LIOTTA_RESIZE_FACTOR: f64 = 1.5;

/// Overlay width relative to head width for the Skull of Satoshi effect.
const SKULL_RESIZE_FACTOR: f64 = 1.9;

/// Overlay width relative to head width for the Cats effect.
const CATS_RESIZE_FACTOR: f64 = 1.5;

/// Which transform to apply to detected heads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Effect {
    /// Blocky pixelation of each head region.
    #[default]
    Pixelate,

    /// Alpha-blend an overlay sticker over each head.
    Overlay(OverlayKind),
}

/// The sticker-style overlay variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Fixed asset at 1.5× head width.
    Liotta,

    /// Fixed asset at 1.9× head width; the placement corner is clamped to
    /// the image before the horizontal bias is applied.
    SkullOfSatoshi,

    /// Random asset per head at 1.5× head width, raised by an extra
    /// width-derived bias and clamped to the image origin.
    Cats,
}

impl OverlayKind {
    /// Placement parameters for this overlay variant.
    pub fn style(&self) -> OverlayStyle {
        match self {
            OverlayKind::Liotta => OverlayStyle {
                resize_factor: LIOTTA_RESIZE_FACTOR,
                clamp_center: false,
                y_bias_width_factor: 0.0,
                clamp_origin: false,
            },
            OverlayKind::SkullOfSatoshi => OverlayStyle {
                resize_factor: SKULL_RESIZE_FACTOR,
                clamp_center: true,
                y_bias_width_factor: 0.0,
                clamp_origin: false,
            },
            OverlayKind::Cats => OverlayStyle {
                resize_factor: CATS_RESIZE_FACTOR,
                clamp_center: false,
                y_bias_width_factor: 0.1,
                clamp_origin: true,
            },
        }
    }
}

/// Output image encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JPEG encoding at the configured quality (transport default).
    #[default]
    Jpeg,

    /// PNG encoding (lossless; the quality setting is ignored).
    Png,
}

/// Result of a single redaction request.
#[derive(Debug, Clone)]
pub struct RedactedPhoto {
    /// The encoded output image bytes.
    pub data: Vec<u8>,

    /// The output format used.
    pub format: OutputFormat,

    /// Width of the output image in pixels.
    pub width: u32,

    /// Height of the output image in pixels.
    pub height: u32,

    /// Number of faces the locator reported.
    pub faces_detected: usize,

    /// Number of head regions actually pixelated or covered. Lower than
    /// `faces_detected` when degenerate or off-image placements were skipped.
    pub regions_rendered: usize,

    /// Size of the original input in bytes.
    pub original_size: usize,
}

/// Builder for redacting faces in a photo.
///
/// Validates the input on construction, then applies face detection, the
/// selected transform, and encoding with configurable parameters.
pub struct FaceRedactor {
    input: Vec<u8>,
    effect: Effect,
    head_scale: f64,
    block_factor: f32,
    quality: u8,
    format: OutputFormat,
    locator: Option<Box<dyn FaceLocator>>,
    assets: Option<AssetRegistry>,
    pool: Option<Arc<WorkerPool>>,
    seed: Option<u64>,
}

impl FaceRedactor {
    /// Create a new redactor from raw encoded image bytes (JPEG, PNG, or WebP).
    pub fn new(input: Vec<u8>) -> Result<Self, RedactError> {
        // Validate that the input looks like a decodable image
        image::guess_format(&input).map_err(|e| RedactError::DecodeError(e.to_string()))?;

        Ok(Self {
            input,
            effect: Effect::default(),
            head_scale: DEFAULT_HEAD_SCALE,
            block_factor: DEFAULT_BLOCK_FACTOR,
            quality: DEFAULT_JPEG_QUALITY,
            format: OutputFormat::default(),
            locator: None,
            assets: None,
            pool: None,
            seed: None,
        })
    }

    /// Select the transform to apply (default: `Effect::Pixelate`).
    pub fn effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    /// Set the head-box expansion factor applied to raw detections
    /// (default: 1.5).
    pub fn head_scale(mut self, scale: f64) -> Self {
        self.head_scale = scale;
        self
    }

    /// Set the pixelation block factor in `(0.0, 1.0]` (default: 0.03).
    /// Only applies to `Effect::Pixelate`.
    pub fn block_factor(mut self, factor: f32) -> Self {
        self.block_factor = factor;
        self
    }

    /// Set the JPEG output quality from 1 to 100 (default: 95).
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Set the output format (default: `OutputFormat::Jpeg`).
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Provide the face locator. Required — `process` fails without one.
    pub fn face_locator(mut self, locator: Box<dyn FaceLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Provide the overlay asset registry. Required for overlay effects.
    pub fn overlay_assets(mut self, registry: AssetRegistry) -> Self {
        self.assets = Some(registry);
        self
    }

    /// Share a worker pool across requests. Without this, a pool with
    /// [`DEFAULT_WORKERS`] threads is built for the request.
    pub fn worker_pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Seed the random asset draw, making overlay selection deterministic.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Run the pipeline: decode, detect, transform, encode.
    ///
    /// Zero detected faces is not an error — the decoded pixels pass
    /// through untouched and are re-encoded.
    pub fn process(self) -> Result<RedactedPhoto, RedactError> {
        if self.quality == 0 || self.quality > 100 {
            return Err(RedactError::InvalidQuality(self.quality));
        }
        if !(self.head_scale > 0.0) {
            return Err(RedactError::InvalidHeadScale(self.head_scale));
        }
        let locator = self.locator.as_deref().ok_or(RedactError::NoFaceLocator)?;

        let decoded = image::load_from_memory(&self.input)
            .map_err(|e| RedactError::DecodeError(e.to_string()))?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(RedactError::ZeroDimensions);
        }

        let gray = decoded.to_luma8();
        let bounds = locator.detect(gray.as_raw(), gray.width(), gray.height());
        let heads: Vec<HeadBox> = bounds
            .iter()
            .map(|b| HeadBox::from_bounds(b, self.head_scale))
            .collect();
        debug!(faces = heads.len(), effect = ?self.effect, "face detection complete");

        let mut image = decoded.to_rgb8();

        let regions_rendered = match &self.effect {
            Effect::Pixelate => {
                let pool = match &self.pool {
                    Some(pool) => Arc::clone(pool),
                    None => Arc::new(WorkerPool::with_default_workers()?),
                };
                pixelate::pixelate_regions(&mut image, &heads, self.block_factor, &pool)?
            }
            Effect::Overlay(kind) => {
                let registry = self.assets.as_ref().ok_or(RedactError::MissingOverlayAssets)?;
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                compositor::blend_overlays(&mut image, &heads, &kind.style(), registry, &mut rng)
            }
        };

        let data = encode_image(&image, &self.format, self.quality)?;

        Ok(RedactedPhoto {
            data,
            format: self.format,
            width: image.width(),
            height: image.height(),
            faces_detected: heads.len(),
            regions_rendered,
            original_size: self.input.len(),
        })
    }
}

/// Encode an RGB image to the requested output format.
fn encode_image(
    image: &RgbImage,
    format: &OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, RedactError> {
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            encoder
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| RedactError::EncodeError(e.to_string()))?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(&mut buffer);
            encoder
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| RedactError::EncodeError(e.to_string()))?;
        }
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoFaces;

    impl FaceLocator for NoFaces {
        fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceBounds> {
            vec![]
        }
    }

    fn make_test_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ])
        });
        encode_image(&img, &OutputFormat::Png, 95).unwrap()
    }

    #[test]
    fn builder_invalid_input() {
        let result = FaceRedactor::new(b"not an image".to_vec());
        assert!(result.is_err());
    }

    #[test]
    fn builder_requires_locator() {
        let png = make_test_png(64, 64);
        let err = FaceRedactor::new(png).unwrap().process().unwrap_err();
        assert!(matches!(err, RedactError::NoFaceLocator));
    }

    #[test]
    fn builder_invalid_quality() {
        let png = make_test_png(64, 64);
        let err = FaceRedactor::new(png)
            .unwrap()
            .face_locator(Box::new(NoFaces))
            .quality(0)
            .process()
            .unwrap_err();
        assert!(matches!(err, RedactError::InvalidQuality(0)));
    }

    #[test]
    fn builder_invalid_head_scale() {
        let png = make_test_png(64, 64);
        let err = FaceRedactor::new(png)
            .unwrap()
            .face_locator(Box::new(NoFaces))
            .head_scale(-1.0)
            .process()
            .unwrap_err();
        assert!(matches!(err, RedactError::InvalidHeadScale(_)));
    }

    #[test]
    fn overlay_effect_requires_assets() {
        let png = make_test_png(64, 64);
        let err = FaceRedactor::new(png)
            .unwrap()
            .effect(Effect::Overlay(OverlayKind::Liotta))
            .face_locator(Box::new(NoFaces))
            .process()
            .unwrap_err();
        assert!(matches!(err, RedactError::MissingOverlayAssets));
    }

    #[test]
    fn zero_faces_roundtrips_pixels_exactly() {
        let png = make_test_png(80, 60);
        let result = FaceRedactor::new(png.clone())
            .unwrap()
            .face_locator(Box::new(NoFaces))
            .output_format(OutputFormat::Png)
            .process()
            .unwrap();

        assert_eq!(result.faces_detected, 0);
        assert_eq!(result.regions_rendered, 0);

        let before = image::load_from_memory(&png).unwrap().to_rgb8();
        let after = image::load_from_memory(&result.data).unwrap().to_rgb8();
        assert_eq!(before.as_raw(), after.as_raw());
    }

    #[test]
    fn jpeg_output_has_magic_bytes() {
        let png = make_test_png(64, 64);
        let result = FaceRedactor::new(png)
            .unwrap()
            .face_locator(Box::new(NoFaces))
            .process()
            .unwrap();
        assert_eq!(result.data[0], 0xFF);
        assert_eq!(result.data[1], 0xD8);
        assert_eq!(result.format, OutputFormat::Jpeg);
    }

    #[test]
    fn original_size_is_preserved() {
        let png = make_test_png(64, 64);
        let original_len = png.len();
        let result = FaceRedactor::new(png)
            .unwrap()
            .face_locator(Box::new(NoFaces))
            .process()
            .unwrap();
        assert_eq!(result.original_size, original_len);
    }

    #[test]
    fn overlay_styles_match_effect_table() {
        let liotta = OverlayKind::Liotta.style();
        assert_eq!(liotta.resize_factor, 1.5);
        assert!(!liotta.clamp_center);

        let skull = OverlayKind::SkullOfSatoshi.style();
        assert_eq!(skull.resize_factor, 1.9);
        assert!(skull.clamp_center);

        let cats = OverlayKind::Cats.style();
        assert_eq!(cats.resize_factor, 1.5);
        assert_eq!(cats.y_bias_width_factor, 0.1);
        assert!(cats.clamp_origin);
    }
}
