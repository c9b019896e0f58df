//! Region compositor: alpha-blend overlay assets onto detected head regions.

use image::imageops::{self, FilterType};
use image::RgbImage;
use rand::Rng;
use tracing::debug;

use crate::assets::AssetRegistry;
use crate::geometry::{clip_placement, overlay_placement, HeadBox, OverlayStyle};

/// Blend one overlay per head box onto `image`, in place.
///
/// For each head an asset is drawn from `registry` (a single-asset registry
/// makes the draw deterministic), its placement computed from `style`, the
/// asset resized to the placement with an area-averaging filter, and the
/// clipped region alpha-blended over the base pixels:
/// `out = α·overlay + (1-α)·base` with α the asset's normalized alpha.
///
/// Heads with degenerate or fully off-image placements are skipped, not
/// errors. Returns the number of regions actually rendered.
pub fn blend_overlays<R: Rng + ?Sized>(
    image: &mut RgbImage,
    heads: &[HeadBox],
    style: &OverlayStyle,
    registry: &AssetRegistry,
    rng: &mut R,
) -> usize {
    let mut rendered = 0;

    for head in heads {
        let asset = registry.pick(rng);

        let Some(rect) = overlay_placement(head, style, asset.aspect_ratio()) else {
            debug!(?head, "skipping head with degenerate overlay placement");
            continue;
        };
        let Some(clip) = clip_placement(&rect, image.width(), image.height()) else {
            debug!(?head, ?rect, "skipping overlay placed entirely outside the image");
            continue;
        };

        let resized = imageops::resize(asset.image(), rect.width, rect.height, FilterType::Triangle);

        for dy in 0..clip.dst.height {
            for dx in 0..clip.dst.width {
                let overlay = resized.get_pixel(clip.src_x + dx, clip.src_y + dy);
                let alpha = overlay.0[3] as f32 / 255.0;
                let base = image.get_pixel_mut(clip.dst.x + dx, clip.dst.y + dy);
                for c in 0..3 {
                    base.0[c] = (alpha * overlay.0[c] as f32 + (1.0 - alpha) * base.0[c] as f32)
                        .round() as u8;
                }
            }
        }

        debug!(?head, ?rect, "overlay rendered");
        rendered += 1;
    }

    rendered
}
