//! Crop rendering: source + transform state → fixed-size raster.
//!
//! The renderer maps each output pixel back into the source (inverse
//! mapping) and interpolates. The scaled source is centered at
//! `(target.width / 2 + pan.x, target.height / 2 + pan.y)` with a linear
//! scale of exactly `zoom`.
//!
//! # Resolutions
//!
//! The same transform can be rendered at two resolutions:
//! - [`Resolution::Preview`] for interactive feedback, downscaled by a
//!   display factor and sampled bilinearly
//! - [`Resolution::Commit`] for the final crop, exactly target-sized and
//!   sampled with Lanczos3. A source that shrinks on output is
//!   prefiltered to its on-output size first, so detail finer than one
//!   output pixel averages out instead of aliasing.
//!
//! Both cover the same crop region with the same center and scale ratio.
//!
//! # Uncovered Pixels
//!
//! - `Cover` fills anything outside the scaled source with opaque black.
//!   Pan clamping makes this unreachable in practice.
//! - `Contain` leaves letterbox areas fully transparent. Previews draw a
//!   light checkerboard underneath so the transparency is visible.

mod sample;

pub use sample::InterpolationFilter;

use crate::decode::{resize, FilterType};
use crate::geometry::FitPolicy;
use crate::raster::{over, Raster, OPAQUE_BLACK, TRANSPARENT};
use crate::transform::TransformState;

/// Checkerboard cell size in preview pixels.
const CHECKER_SIZE: u32 = 10;
const CHECKER_DARK: [u8; 4] = [0xe0, 0xe0, 0xe0, 0xff];
const CHECKER_LIGHT: [u8; 4] = [0xf5, 0xf5, 0xf5, 0xff];

/// Output resolution of a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Exactly the target dimensions.
    Commit,
    /// Target dimensions multiplied by a display factor.
    Preview(f64),
}

impl Resolution {
    /// Output size for the given target size, never smaller than 1x1.
    pub fn output_size(self, target_width: u32, target_height: u32) -> (u32, u32) {
        match self {
            Resolution::Commit => (target_width, target_height),
            Resolution::Preview(factor) => {
                let factor = if factor.is_finite() && factor > 0.0 {
                    factor
                } else {
                    1.0
                };
                let w = (target_width as f64 * factor).round().max(1.0) as u32;
                let h = (target_height as f64 * factor).round().max(1.0) as u32;
                (w, h)
            }
        }
    }
}

/// Render the crop described by `state` from `source`.
///
/// Pure: the state is read, never written. The pan used is the clamped
/// pan, so a stale out-of-range pan can never produce a border. Callers
/// that need the correction stored call [`TransformState::normalize`]
/// first.
pub fn render(
    source: &Raster,
    state: &TransformState,
    resolution: Resolution,
    filter: InterpolationFilter,
) -> Raster {
    let target = state.target();
    let policy = state.policy();
    let (out_w, out_h) = resolution.output_size(target.width, target.height);

    let fill = match policy {
        FitPolicy::Cover => OPAQUE_BLACK,
        FitPolicy::Contain => TRANSPARENT,
    };
    let checkerboard =
        policy == FitPolicy::Contain && matches!(resolution, Resolution::Preview(_));

    if source.is_empty() || target.width == 0 || target.height == 0 {
        return Raster::filled(out_w, out_h, fill);
    }

    let zoom = state.zoom();
    let pan = state.effective_pan();
    let scaled_w = source.width as f64 * zoom;
    let scaled_h = source.height as f64 * zoom;
    let left = target.width as f64 / 2.0 + pan.x - scaled_w / 2.0;
    let top = target.height as f64 / 2.0 + pan.y - scaled_h / 2.0;

    // Output pixels per target pixel on each axis
    let fx = out_w as f64 / target.width as f64;
    let fy = out_h as f64 / target.height as f64;

    let prefiltered = match filter {
        InterpolationFilter::Lanczos3 => prefilter(source, zoom * fx, zoom * fy),
        InterpolationFilter::Bilinear => None,
    };
    let sampled_source = prefiltered.as_ref().unwrap_or(source);
    let kx = sampled_source.width as f64 / source.width as f64;
    let ky = sampled_source.height as f64 / source.height as f64;

    // Sample position per output column/row, None when uncovered
    let columns: Vec<Option<f64>> = (0..out_w)
        .map(|ox| {
            let u = source_coord(ox, fx, left, zoom, source.width)?;
            Some(u * kx - 0.5)
        })
        .collect();
    let rows: Vec<Option<f64>> = (0..out_h)
        .map(|oy| {
            let v = source_coord(oy, fy, top, zoom, source.height)?;
            Some(v * ky - 0.5)
        })
        .collect();

    let mut pixels = Vec::with_capacity(out_w as usize * out_h as usize * 4);
    for (oy, row) in rows.iter().enumerate() {
        for (ox, column) in columns.iter().enumerate() {
            let sampled = match (column, row) {
                (Some(sx), Some(sy)) => Some(sample::sample(sampled_source, *sx, *sy, filter)),
                _ => None,
            };
            let pixel = if checkerboard {
                let base = checker_color(ox as u32, oy as u32);
                match sampled {
                    Some(px) => over(base, px),
                    None => base,
                }
            } else {
                sampled.unwrap_or(fill)
            };
            pixels.extend_from_slice(&pixel);
        }
    }

    Raster::new(out_w, out_h, pixels)
}

/// Render the full-resolution crop for a commit.
#[tracing::instrument(
    skip_all,
    fields(
        zoom = state.zoom(),
        width = state.target().width,
        height = state.target().height,
    )
)]
pub fn render_commit(source: &Raster, state: &TransformState) -> Raster {
    render(
        source,
        state,
        Resolution::Commit,
        InterpolationFilter::Lanczos3,
    )
}

/// Render a downscaled preview of the crop.
pub fn render_preview(source: &Raster, state: &TransformState, scale: f64) -> Raster {
    render(
        source,
        state,
        Resolution::Preview(scale),
        InterpolationFilter::Bilinear,
    )
}

/// Map an output pixel index to a continuous source coordinate.
///
/// The output pixel center lands at `(index + 0.5) / factor` in target
/// space, then at `(t - origin) / zoom` in source space where source pixel
/// `i` spans `[i, i + 1)`. Subtract `0.5` for a pixel-center coordinate.
#[inline]
fn source_coord(index: u32, factor: f64, origin: f64, zoom: f64, extent: u32) -> Option<f64> {
    let t = (index as f64 + 0.5) / factor;
    let u = (t - origin) / zoom;
    if u >= 0.0 && u < extent as f64 {
        Some(u)
    } else {
        None
    }
}

/// Downscale `source` to its on-output size before sampling.
///
/// A fixed-radius kernel aliases once one output pixel spans more than one
/// source pixel, so shrinking renders resample the whole source with the
/// wider Lanczos3 support of `imageops::resize` first. Returns `None` when
/// no axis shrinks.
fn prefilter(source: &Raster, scale_x: f64, scale_y: f64) -> Option<Raster> {
    if scale_x >= 1.0 && scale_y >= 1.0 {
        return None;
    }
    let width = (source.width as f64 * scale_x.min(1.0)).round().max(1.0) as u32;
    let height = (source.height as f64 * scale_y.min(1.0)).round().max(1.0) as u32;
    match resize(source, width, height, FilterType::Lanczos3) {
        Ok(raster) => Some(raster),
        Err(err) => {
            tracing::warn!(%err, "prefilter failed, sampling the full-size source");
            None
        }
    }
}

#[inline]
fn checker_color(x: u32, y: u32) -> [u8; 4] {
    if ((x / CHECKER_SIZE) + (y / CHECKER_SIZE)) % 2 == 0 {
        CHECKER_DARK
    } else {
        CHECKER_LIGHT
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
