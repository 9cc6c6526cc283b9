//! Fit scale, zoom bounds and pan clamping.
//!
//! Pure functions with no state. Zoom is always the absolute linear scale
//! applied to the source: `zoom = 1.0` maps one source pixel to one target
//! pixel, and [`min_zoom_for`] returns the scale at which the source exactly
//! satisfies its fit policy. Pan is measured in target-canvas pixels and is
//! zero for a centered crop.
//!
//! Every function is total for finite non-negative input. Degenerate sizes
//! (any zero dimension) fall back to a zoom of `1.0` and a zero pan.

use serde::{Deserialize, Serialize};

/// Fixed upper bound of the interactive zoom range.
pub const MAX_ZOOM: f64 = 3.0;

/// How a source is fitted into its target before the user zooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitPolicy {
    /// Fill the target completely, cropping overflow. Never leaves a border.
    Cover,
    /// Fit the whole source inside the target, possibly leaving a border.
    Contain,
}

/// Pan offset of the scaled source's center from the target's center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pan {
    pub x: f64,
    pub y: f64,
}

impl Pan {
    pub const ZERO: Pan = Pan { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Zoom at which the source exactly satisfies `policy` with no slack.
///
/// `Cover` takes the larger of the two axis ratios so both axes reach the
/// target; `Contain` takes the smaller so neither axis exceeds it.
pub fn min_zoom_for(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
    policy: FitPolicy,
) -> f64 {
    if source_width == 0 || source_height == 0 || target_width == 0 || target_height == 0 {
        return 1.0;
    }

    let ratio_x = target_width as f64 / source_width as f64;
    let ratio_y = target_height as f64 / source_height as f64;

    let zoom = match policy {
        FitPolicy::Cover => ratio_x.max(ratio_y),
        FitPolicy::Contain => ratio_x.min(ratio_y),
    };

    if zoom.is_finite() && zoom > 0.0 {
        zoom
    } else {
        1.0
    }
}

/// Size of the source after scaling by `zoom`.
#[inline]
pub fn scaled_size(source_width: u32, source_height: u32, zoom: f64) -> (f64, f64) {
    (source_width as f64 * zoom, source_height as f64 * zoom)
}

/// Clamp a pan so the scaled source keeps covering the target.
///
/// Only `Cover` can overflow, so only `Cover` admits a non-zero pan. Each
/// axis is clamped independently to half the overflow on that axis.
pub fn clamp_pan(
    pan: Pan,
    scaled_width: f64,
    scaled_height: f64,
    target_width: u32,
    target_height: u32,
    policy: FitPolicy,
) -> Pan {
    match policy {
        FitPolicy::Contain => Pan::ZERO,
        FitPolicy::Cover => {
            let max_x = max_offset(scaled_width, target_width);
            let max_y = max_offset(scaled_height, target_height);
            Pan {
                x: clamp_axis(pan.x, max_x),
                y: clamp_axis(pan.y, max_y),
            }
        }
    }
}

/// Half the overflow of `scaled` past `target`, never negative.
#[inline]
fn max_offset(scaled: f64, target: u32) -> f64 {
    let offset = (scaled - target as f64) / 2.0;
    if offset.is_finite() {
        offset.max(0.0)
    } else {
        0.0
    }
}

#[inline]
fn clamp_axis(value: f64, limit: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(-limit, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_wide_source_constrained_by_height() {
        // 6000x2000 into 3240x1920: height ratio 0.96 beats width ratio 0.54
        let zoom = min_zoom_for(6000, 2000, 3240, 1920, FitPolicy::Cover);
        assert!((zoom - 0.96).abs() < 1e-12);
    }

    #[test]
    fn test_cover_tall_source_constrained_by_width() {
        let zoom = min_zoom_for(1000, 4000, 3240, 1920, FitPolicy::Cover);
        assert!((zoom - 3.24).abs() < 1e-12);
    }

    #[test]
    fn test_contain_picks_smaller_ratio() {
        let zoom = min_zoom_for(1580, 1122, 790, 1122, FitPolicy::Contain);
        assert!((zoom - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_matching_aspect_gives_common_ratio() {
        let cover = min_zoom_for(1580, 2244, 790, 1122, FitPolicy::Cover);
        let contain = min_zoom_for(1580, 2244, 790, 1122, FitPolicy::Contain);
        assert!((cover - 0.5).abs() < 1e-12);
        assert!((contain - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_sizes_fall_back_to_unit_zoom() {
        assert_eq!(min_zoom_for(0, 100, 3240, 1920, FitPolicy::Cover), 1.0);
        assert_eq!(min_zoom_for(100, 0, 3240, 1920, FitPolicy::Contain), 1.0);
        assert_eq!(min_zoom_for(100, 100, 0, 1920, FitPolicy::Cover), 1.0);
        assert_eq!(min_zoom_for(100, 100, 3240, 0, FitPolicy::Contain), 1.0);
    }

    #[test]
    fn test_scaled_size() {
        assert_eq!(scaled_size(100, 50, 2.0), (200.0, 100.0));
        assert_eq!(scaled_size(0, 0, 3.0), (0.0, 0.0));
    }

    #[test]
    fn test_clamp_pan_cover_limits_each_axis() {
        let pan = Pan::new(500.0, -500.0);
        let pan = clamp_pan(pan, 3600.0, 2000.0, 3240, 1920, FitPolicy::Cover);
        assert_eq!(pan, Pan::new(180.0, -40.0));
    }

    #[test]
    fn test_clamp_pan_cover_without_overflow_is_zero() {
        let pan = Pan::new(10.0, 10.0);
        let pan = clamp_pan(pan, 3240.0, 1920.0, 3240, 1920, FitPolicy::Cover);
        assert_eq!(pan, Pan::ZERO);
    }

    #[test]
    fn test_clamp_pan_contain_always_centered() {
        let pan = Pan::new(42.0, -7.0);
        let pan = clamp_pan(pan, 2000.0, 3000.0, 790, 1122, FitPolicy::Contain);
        assert_eq!(pan, Pan::ZERO);
    }

    #[test]
    fn test_clamp_pan_non_finite_becomes_zero() {
        let pan = clamp_pan(
            Pan::new(f64::NAN, f64::INFINITY),
            4000.0,
            4000.0,
            3240,
            1920,
            FitPolicy::Cover,
        );
        assert_eq!(pan, Pan::ZERO);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
