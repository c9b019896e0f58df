//! Pixelation transform: blocky redaction of head regions.

use image::imageops::{self, FilterType};
use image::RgbImage;
use rayon::prelude::*;
use tracing::debug;

use crate::error::RedactError;
use crate::geometry::{HeadBox, Region};
use crate::worker_pool::WorkerPool;

/// Pixelate each head region of `image`, in place.
///
/// Each box is clipped to the image, downsampled to `block_factor` of its
/// linear resolution with nearest-neighbor sampling, and upsampled back to
/// its exact original dimensions. Tiles are computed in parallel on `pool`
/// from a shared read of the image and committed sequentially after the
/// join, so overlapping head boxes cannot race. The call blocks until all
/// tiles are written.
///
/// Returns the number of regions pixelated. Boxes with no area inside the
/// image are skipped, not errors.
pub fn pixelate_regions(
    image: &mut RgbImage,
    heads: &[HeadBox],
    block_factor: f32,
    pool: &WorkerPool,
) -> Result<usize, RedactError> {
    if !(block_factor > 0.0 && block_factor <= 1.0) {
        return Err(RedactError::InvalidBlockFactor(block_factor));
    }

    let (width, height) = (image.width(), image.height());
    let regions: Vec<Region> = heads
        .iter()
        .filter_map(|head| {
            let clipped = head.clip(width, height);
            if clipped.is_none() {
                debug!(?head, "skipping head with no area inside the image");
            }
            clipped
        })
        .collect();

    let src: &RgbImage = image;
    let tiles: Vec<(Region, RgbImage)> = pool.run(|| {
        regions
            .par_iter()
            .map(|region| (*region, pixelate_tile(src, region, block_factor)))
            .collect()
    });

    for (region, tile) in &tiles {
        debug_assert_eq!((tile.width(), tile.height()), (region.width, region.height));
        imageops::replace(image, tile, region.x as i64, region.y as i64);
    }

    Ok(tiles.len())
}

/// Downsample-then-upsample a single region into a standalone tile.
fn pixelate_tile(image: &RgbImage, region: &Region, block_factor: f32) -> RgbImage {
    let view = imageops::crop_imm(image, region.x, region.y, region.width, region.height).to_image();
    let down_w = ((region.width as f32 * block_factor) as u32).max(1);
    let down_h = ((region.height as f32 * block_factor) as u32).max(1);
    let down = imageops::resize(&view, down_w, down_h, FilterType::Nearest);
    imageops::resize(&down, region.width, region.height, FilterType::Nearest)
}
