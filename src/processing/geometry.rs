//! Target geometry resolution.
//!
//! Pure functions from source dimensions to the output canvas, scale and
//! crop placement. No pixels are touched here, which keeps every branch
//! testable without decoding a single image.

use serde::Serialize;

use crate::core::PipelineConfig;
use crate::utils::{PipelineError, PipelineResult};

/// Placement of a source image on the output canvas.
///
/// Derived from the source dimensions alone and recomputed on every run.
/// `scaled_width`/`scaled_height` are the source dimensions after applying
/// `scale`; the offsets center that scaled image on the canvas and are zero
/// or negative (negative means the overflow is cropped symmetrically).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryPlan {
    pub target_width: u32,
    pub target_height: u32,
    pub scale: f64,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub offset_x: i64,
    pub offset_y: i64,
    pub upscale_warning: bool,
}

/// Chooses the output canvas and cover-fit placement for a source image.
///
/// Canvas selection: sources at least as wide as the large preset get the
/// large canvas (1920x1080 by default), everything narrower gets the small
/// one (1280x720). The result is a canonical 16:9 canvas regardless of the
/// source aspect ratio.
///
/// The scale factor is `max(target_w/src_w, target_h/src_h)`, a "cover" fit:
/// the image is scaled until both axes fully cover the canvas, centered, and
/// the overflow is cropped evenly from both sides.
///
/// `upscale_warning` is set when the source sits below the recommended
/// minimum resolution and had to be enlarged. Informational only; it never
/// changes the geometry.
pub fn resolve(width: u32, height: u32, config: &PipelineConfig) -> PipelineResult<GeometryPlan> {
    if width == 0 || height == 0 {
        // Fail fast instead of producing divide-by-zero geometry.
        return Err(PipelineError::decode("image has zero width or height"));
    }

    let preset = if width >= config.preset_large.width {
        config.preset_large
    } else {
        config.preset_small
    };

    let scale = f64::max(
        preset.width as f64 / width as f64,
        preset.height as f64 / height as f64,
    );

    // Rounding can land a fraction of a pixel short of the canvas on the
    // non-driving axis; clamp so the crop always has full coverage.
    let scaled_width = ((width as f64 * scale).round() as u32).max(preset.width);
    let scaled_height = ((height as f64 * scale).round() as u32).max(preset.height);

    let upscale_warning =
        width < config.min_recommended_width || height < config.min_recommended_height;

    Ok(GeometryPlan {
        target_width: preset.width,
        target_height: preset.height,
        scale,
        scaled_width,
        scaled_height,
        offset_x: (preset.width as i64 - scaled_width as i64) / 2,
        offset_y: (preset.height as i64 - scaled_height as i64) / 2,
        upscale_warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_default(width: u32, height: u32) -> GeometryPlan {
        resolve(width, height, &PipelineConfig::default()).unwrap()
    }

    #[test]
    fn wide_sources_target_the_large_preset() {
        let plan = resolve_default(2560, 1440);
        assert_eq!((plan.target_width, plan.target_height), (1920, 1080));
        assert!(!plan.upscale_warning);
    }

    #[test]
    fn small_sources_target_the_small_preset_with_warning() {
        let plan = resolve_default(640, 360);
        assert_eq!((plan.target_width, plan.target_height), (1280, 720));
        assert!(plan.upscale_warning);
        // Exact 16:9 source: doubled to cover the canvas exactly, no crop.
        assert_eq!((plan.scaled_width, plan.scaled_height), (1280, 720));
        assert_eq!((plan.offset_x, plan.offset_y), (0, 0));
    }

    #[test]
    fn boundary_width_uses_the_large_preset() {
        let plan = resolve_default(1920, 1080);
        assert_eq!((plan.target_width, plan.target_height), (1920, 1080));
        assert_eq!(plan.scale, 1.0);
        assert!(!plan.upscale_warning);
    }

    #[test]
    fn just_under_the_boundary_uses_the_small_preset() {
        let plan = resolve_default(1919, 1080);
        assert_eq!((plan.target_width, plan.target_height), (1280, 720));
    }

    #[test]
    fn portrait_sources_are_cover_fit_and_cropped_vertically() {
        // 1000x2000 on a 1280x720 canvas: width drives the scale (1.28),
        // height overflows and is cropped top and bottom.
        let plan = resolve_default(1000, 2000);
        assert_eq!(plan.scaled_width, 1280);
        assert_eq!(plan.scaled_height, 2560);
        assert_eq!(plan.offset_x, 0);
        assert_eq!(plan.offset_y, (720 - 2560) / 2);
        assert!(plan.offset_y < 0);
    }

    #[test]
    fn wide_panorama_is_cropped_horizontally() {
        let plan = resolve_default(4000, 1100);
        assert_eq!((plan.target_width, plan.target_height), (1920, 1080));
        // Height drives the scale, the width overflow splits evenly.
        assert_eq!(plan.scaled_height, 1080);
        assert!(plan.scaled_width > 1920);
        assert_eq!(plan.offset_x, (1920 - plan.scaled_width as i64) / 2);
    }

    #[test]
    fn tall_source_below_minimum_height_warns() {
        // Wide enough for the large preset but shorter than 720.
        let plan = resolve_default(2000, 600);
        assert_eq!((plan.target_width, plan.target_height), (1920, 1080));
        assert!(plan.upscale_warning);
    }

    #[test]
    fn zero_dimensions_fail_fast() {
        let config = PipelineConfig::default();
        assert!(resolve(0, 720, &config).is_err());
        assert!(resolve(1280, 0, &config).is_err());
    }

    #[test]
    fn scaled_size_always_covers_the_canvas() {
        for (w, h) in [(123, 457), (1279, 721), (1921, 5), (7, 3000), (853, 480)] {
            let plan = resolve_default(w, h);
            assert!(plan.scaled_width >= plan.target_width, "{w}x{h}");
            assert!(plan.scaled_height >= plan.target_height, "{w}x{h}");
            assert!(plan.offset_x <= 0 && plan.offset_y <= 0, "{w}x{h}");
        }
    }
}
