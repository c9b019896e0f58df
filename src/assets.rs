//! Overlay assets: alpha-channel images decoded once and selected per head.
//!
//! The registry is built a single time at startup and passed by reference,
//! so processing a request never touches the filesystem and the random draw
//! is a pure function of the registry size and the caller's rng.

use std::path::Path;

use image::RgbaImage;
use rand::Rng;

use crate::error::RedactError;

/// A read-only overlay image with an alpha channel.
#[derive(Debug, Clone)]
pub struct OverlayAsset {
    image: RgbaImage,
}

impl OverlayAsset {
    /// Decode an overlay from encoded bytes (PNG, WebP, ...).
    ///
    /// Inputs without an alpha channel decode to fully opaque overlays.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RedactError> {
        Self::decode("<memory>", bytes)
    }

    /// Load and decode an overlay from a file on disk.
    ///
    /// A missing or undecodable file is fatal for the caller — there is no
    /// fallback asset.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RedactError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| RedactError::AssetLoad {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        Self::decode(&display, &bytes)
    }

    /// Wrap already-decoded RGBA pixels.
    pub fn from_rgba(image: RgbaImage) -> Result<Self, RedactError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(RedactError::ZeroDimensions);
        }
        Ok(Self { image })
    }

    fn decode(path: &str, bytes: &[u8]) -> Result<Self, RedactError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| RedactError::AssetLoad {
                path: path.to_string(),
                reason: e.to_string(),
            })?
            .to_rgba8();
        Self::from_rgba(image)
    }

    /// Asset width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Asset height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width over height. Always finite and positive — zero-dimension
    /// assets are rejected at construction.
    pub fn aspect_ratio(&self) -> f64 {
        self.image.width() as f64 / self.image.height() as f64
    }

    pub(crate) fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Overlay assets enumerated once at startup.
///
/// Registry constructors reject empty sets, so [`AssetRegistry::pick`] can
/// always return an asset.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    assets: Vec<OverlayAsset>,
}

impl AssetRegistry {
    /// Registry holding a single fixed asset.
    pub fn single(asset: OverlayAsset) -> Self {
        Self {
            assets: vec![asset],
        }
    }

    /// Registry from a pre-built asset list.
    pub fn new(assets: Vec<OverlayAsset>) -> Result<Self, RedactError> {
        if assets.is_empty() {
            return Err(RedactError::EmptyAssetRegistry);
        }
        Ok(Self { assets })
    }

    /// Load `{prefix}_1.png` through `{prefix}_{count}.png` from `dir`.
    ///
    /// Any missing or undecodable file fails the whole registry; a count of
    /// zero is [`RedactError::EmptyAssetRegistry`].
    pub fn from_numbered_files(
        dir: impl AsRef<Path>,
        prefix: &str,
        count: u32,
    ) -> Result<Self, RedactError> {
        if count == 0 {
            return Err(RedactError::EmptyAssetRegistry);
        }
        let dir = dir.as_ref();
        let mut assets = Vec::with_capacity(count as usize);
        for i in 1..=count {
            assets.push(OverlayAsset::open(dir.join(format!("{prefix}_{i}.png")))?);
        }
        Ok(Self { assets })
    }

    /// Number of assets in the registry.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Always `false` — constructors reject empty registries.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Draw an asset uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &OverlayAsset {
        &self.assets[rng.gen_range(0..self.assets.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, image::Rgba(rgba))
    }

    fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        use image::codecs::png::PngEncoder;
        use image::ImageEncoder;

        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgba8,
            )
            .unwrap();
        buffer
    }

    #[test]
    fn from_bytes_decodes_png() {
        let bytes = png_bytes(&solid_rgba(4, 8, [1, 2, 3, 200]));
        let asset = OverlayAsset::from_bytes(&bytes).unwrap();
        assert_eq!(asset.width(), 4);
        assert_eq!(asset.height(), 8);
        assert!((asset.aspect_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        let err = OverlayAsset::from_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, RedactError::AssetLoad { .. }));
    }

    #[test]
    fn open_missing_file_is_fatal() {
        let err = OverlayAsset::open("/nonexistent/cat_1.png").unwrap_err();
        assert!(matches!(err, RedactError::AssetLoad { .. }));
    }

    #[test]
    fn empty_registry_rejected() {
        assert!(matches!(
            AssetRegistry::new(vec![]),
            Err(RedactError::EmptyAssetRegistry)
        ));
        assert!(matches!(
            AssetRegistry::from_numbered_files("/tmp", "cat", 0),
            Err(RedactError::EmptyAssetRegistry)
        ));
    }

    #[test]
    fn from_numbered_files_loads_all() {
        let dir = tempfile::tempdir().unwrap();
        for i in 1..=3u32 {
            let bytes = png_bytes(&solid_rgba(i, i, [0, 0, 0, 255]));
            std::fs::write(dir.path().join(format!("cat_{i}.png")), bytes).unwrap();
        }
        let registry = AssetRegistry::from_numbered_files(dir.path(), "cat", 3).unwrap();
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn from_numbered_files_gap_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // cat_2.png is missing
        let bytes = png_bytes(&solid_rgba(2, 2, [0, 0, 0, 255]));
        std::fs::write(dir.path().join("cat_1.png"), bytes).unwrap();
        let err = AssetRegistry::from_numbered_files(dir.path(), "cat", 2).unwrap_err();
        assert!(matches!(err, RedactError::AssetLoad { .. }));
    }

    #[test]
    fn pick_is_uniform_under_seeded_rng() {
        // Distinguish assets by width: 1, 2, 3, 4.
        let assets = (1..=4u32)
            .map(|i| OverlayAsset::from_rgba(solid_rgba(i, i, [0, 0, 0, 255])).unwrap())
            .collect();
        let registry = AssetRegistry::new(assets).unwrap();

        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; 4];
        let draws = 4000;
        for _ in 0..draws {
            counts[registry.pick(&mut rng).width() as usize - 1] += 1;
        }

        for (i, &count) in counts.iter().enumerate() {
            assert!(
                (800..=1200).contains(&count),
                "asset {} drawn {} times out of {}",
                i + 1,
                count,
                draws
            );
        }
    }

    #[test]
    fn pick_single_asset_is_deterministic() {
        let registry =
            AssetRegistry::single(OverlayAsset::from_rgba(solid_rgba(5, 5, [9, 9, 9, 255])).unwrap());
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            assert_eq!(registry.pick(&mut rng).width(), 5);
        }
    }
}
