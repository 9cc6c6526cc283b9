//! Grid layout configuration.
//!
//! All target sizes and presentation scales live in [`GridLayout`]. The
//! defaults describe a three-column Instagram grid: a 3240×1920 background
//! split into three 1080-wide tiles, with a 790×1122 overlay (the "reel"
//! poster) centered in one of them.
//!
//! The struct is serde-deserializable with per-field defaults, so a host can
//! override a single value without restating the rest. Layouts from a host
//! are untrusted: run [`GridLayout::validate`] before rendering with one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{FitPolicy, MAX_ZOOM};

/// Background target width (three tiles wide).
pub const BACKGROUND_WIDTH: u32 = 3240;
/// Background target height (the full reel height).
pub const BACKGROUND_HEIGHT: u32 = 1920;
/// Overlay target width.
pub const OVERLAY_WIDTH: u32 = 790;
/// Overlay target height.
pub const OVERLAY_HEIGHT: u32 = 1122;
/// Width of one exported tile.
pub const TILE_WIDTH: u32 = 1080;
/// Height of a regular (non-highlighted) tile.
pub const TILE_HEIGHT_STANDARD: u32 = 1350;
/// Height of the highlighted tile.
pub const TILE_HEIGHT_HIGHLIGHTED: u32 = 1920;
/// Largest side any target, tile or composite may have.
pub const MAX_SIDE: u32 = 16_384;

/// Reasons a layout is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// A pixel size is zero or too large.
    #[error("{field} must be between 1 and {max} pixels, got {value}")]
    Dimension {
        field: &'static str,
        value: u32,
        max: u32,
    },

    /// A presentation scale is not a finite value in (0, 1].
    #[error("{field} must be a finite value in (0, 1], got {value}")]
    Scale { field: &'static str, value: f64 },

    /// The zoom ceiling is not finite and positive.
    #[error("maxZoom must be finite and positive, got {0}")]
    MaxZoom(f64),
}

/// Fixed output dimensions for one slot kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub width: u32,
    pub height: u32,
}

impl TargetSpec {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, or `0.0` for a zero-height target.
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}

/// The two logical upload slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// The wide photo spanning all three tiles.
    Background,
    /// The portrait image placed on the highlighted tile.
    Overlay,
}

impl SlotKind {
    /// Fit policy used when cropping this slot.
    pub fn policy(self) -> FitPolicy {
        match self {
            SlotKind::Background => FitPolicy::Cover,
            SlotKind::Overlay => FitPolicy::Contain,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SlotKind::Background => "background",
            SlotKind::Overlay => "overlay",
        }
    }

    pub fn parse(name: &str) -> Option<SlotKind> {
        match name {
            "background" => Some(SlotKind::Background),
            "overlay" => Some(SlotKind::Overlay),
            _ => None,
        }
    }
}

/// Every dimension and scale the editor works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridLayout {
    /// Background crop target.
    pub background: TargetSpec,
    /// Overlay crop target.
    pub overlay: TargetSpec,
    /// Width of each of the three tiles.
    pub tile_width: u32,
    /// Height of the non-highlighted tiles.
    pub tile_height_standard: u32,
    /// Height of the highlighted tile.
    pub tile_height_highlighted: u32,
    /// Upper zoom bound for both slots.
    pub max_zoom: f64,
    /// Display scale of the interactive crop preview.
    pub crop_preview_scale: f64,
    /// Display scale of the composed grid preview.
    pub grid_preview_scale: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            background: TargetSpec::new(BACKGROUND_WIDTH, BACKGROUND_HEIGHT),
            overlay: TargetSpec::new(OVERLAY_WIDTH, OVERLAY_HEIGHT),
            tile_width: TILE_WIDTH,
            tile_height_standard: TILE_HEIGHT_STANDARD,
            tile_height_highlighted: TILE_HEIGHT_HIGHLIGHTED,
            max_zoom: MAX_ZOOM,
            crop_preview_scale: 0.3,
            grid_preview_scale: 0.25,
        }
    }
}

impl GridLayout {
    /// Target dimensions for a slot kind.
    pub fn target(&self, kind: SlotKind) -> TargetSpec {
        match kind {
            SlotKind::Background => self.background,
            SlotKind::Overlay => self.overlay,
        }
    }

    /// Width of the composite canvas (three tiles).
    pub fn composite_width(&self) -> u32 {
        self.tile_width.saturating_mul(3)
    }

    /// Check every size and scale before the layout is used.
    ///
    /// # Errors
    ///
    /// Returns the first field that is out of range. The tile width is
    /// capped so the three-tile composite also fits within [`MAX_SIDE`].
    pub fn validate(&self) -> Result<(), LayoutError> {
        let highlighted = self.tile_height_highlighted;
        let sides = [
            ("background.width", self.background.width, MAX_SIDE),
            ("background.height", self.background.height, MAX_SIDE),
            ("overlay.width", self.overlay.width, MAX_SIDE),
            ("overlay.height", self.overlay.height, MAX_SIDE),
            ("tileWidth", self.tile_width, MAX_SIDE / 3),
            ("tileHeightStandard", self.tile_height_standard, MAX_SIDE),
            ("tileHeightHighlighted", highlighted, MAX_SIDE),
        ];
        for (field, value, max) in sides {
            if value == 0 || value > max {
                return Err(LayoutError::Dimension { field, value, max });
            }
        }

        for (field, value) in [
            ("cropPreviewScale", self.crop_preview_scale),
            ("gridPreviewScale", self.grid_preview_scale),
        ] {
            if !(value.is_finite() && value > 0.0 && value <= 1.0) {
                return Err(LayoutError::Scale { field, value });
            }
        }

        if !(self.max_zoom.is_finite() && self.max_zoom > 0.0) {
            return Err(LayoutError::MaxZoom(self.max_zoom));
        }
        Ok(())
    }

    /// Top edge of the standard-height band inside the background.
    pub fn standard_band_top(&self) -> u32 {
        self.background
            .height
            .saturating_sub(self.tile_height_standard)
            / 2
    }
}
