//! Per-slot interactive crop parameters.
//!
//! A [`TransformState`] is reset once per upload and then mutated by zoom
//! and pan gestures. Every mutation re-clamps the pan against the current
//! scaled size, so the state never describes a crop with an empty border
//! under [`FitPolicy::Cover`].

use serde::{Deserialize, Serialize};

use crate::geometry::{clamp_pan, min_zoom_for, scaled_size, FitPolicy, Pan, MAX_ZOOM};
use crate::layout::TargetSpec;

/// Zoom and pan for one slot, in the same unit space as the geometry engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformState {
    zoom: f64,
    pan: Pan,
    min_zoom: f64,
    max_zoom: f64,
    source_width: u32,
    source_height: u32,
    target: TargetSpec,
    policy: FitPolicy,
}

impl TransformState {
    /// Create a state freshly reset for the given source and target.
    pub fn new(
        source_width: u32,
        source_height: u32,
        target: TargetSpec,
        policy: FitPolicy,
    ) -> Self {
        Self::with_max_zoom(source_width, source_height, target, policy, MAX_ZOOM)
    }

    /// Like [`new`](Self::new) with an explicit upper zoom bound.
    pub fn with_max_zoom(
        source_width: u32,
        source_height: u32,
        target: TargetSpec,
        policy: FitPolicy,
        max_zoom: f64,
    ) -> Self {
        let mut state = Self {
            zoom: 1.0,
            pan: Pan::ZERO,
            min_zoom: 1.0,
            max_zoom: MAX_ZOOM,
            source_width,
            source_height,
            target,
            policy,
        };
        state.reset_with_max(source_width, source_height, target, policy, max_zoom);
        state
    }

    /// Recompute the zoom range for a new source and recenter.
    ///
    /// `zoom` starts at the minimum, where the source exactly satisfies the
    /// policy. The upper bound is [`MAX_ZOOM`], raised to the minimum for
    /// sources so small that even the fit scale exceeds it.
    pub fn reset(
        &mut self,
        source_width: u32,
        source_height: u32,
        target: TargetSpec,
        policy: FitPolicy,
    ) {
        self.reset_with_max(source_width, source_height, target, policy, MAX_ZOOM);
    }

    /// Like [`reset`](Self::reset) with an explicit upper zoom bound.
    pub fn reset_with_max(
        &mut self,
        source_width: u32,
        source_height: u32,
        target: TargetSpec,
        policy: FitPolicy,
        max_zoom: f64,
    ) {
        let min_zoom = min_zoom_for(
            source_width,
            source_height,
            target.width,
            target.height,
            policy,
        );
        let max_zoom = if max_zoom.is_finite() {
            max_zoom
        } else {
            MAX_ZOOM
        };

        self.source_width = source_width;
        self.source_height = source_height;
        self.target = target;
        self.policy = policy;
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom.max(min_zoom);
        self.zoom = min_zoom;
        self.pan = Pan::ZERO;
    }

    /// Set the zoom, clamped to `[min_zoom, max_zoom]`, and re-clamp the pan.
    ///
    /// Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        let pan = self.clamped(self.pan, zoom);
        self.zoom = zoom;
        self.pan = pan;
    }

    /// Move the crop by a delta in target-canvas pixels.
    pub fn set_pan(&mut self, delta: Pan) {
        let moved = Pan::new(self.pan.x + delta.x, self.pan.y + delta.y);
        self.pan = self.clamped(moved, self.zoom);
    }

    /// Move the crop by a drag delta measured in screen pixels.
    ///
    /// `display_scale` is the ratio of on-screen preview size to target
    /// size. Non-positive or non-finite scales are ignored.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64, display_scale: f64) {
        if !display_scale.is_finite() || display_scale <= 0.0 {
            return;
        }
        self.set_pan(Pan::new(dx / display_scale, dy / display_scale));
    }

    /// Re-clamp the stored pan. Returns `true` when it had to move.
    pub fn normalize(&mut self) -> bool {
        let clamped = self.clamped(self.pan, self.zoom);
        if clamped == self.pan {
            return false;
        }
        tracing::debug!(
            from_x = self.pan.x,
            from_y = self.pan.y,
            to_x = clamped.x,
            to_y = clamped.y,
            "pan corrected"
        );
        self.pan = clamped;
        true
    }

    /// Apply a zoom percentage typed by the user.
    ///
    /// The text is read like a browser `parseInt`: optional leading
    /// whitespace and sign, then digits; anything after the digits is
    /// ignored. Unparseable text falls back to the current percentage.
    /// Returns the percentage to display after clamping.
    pub fn set_zoom_percent_text(&mut self, text: &str) -> i64 {
        let percent = parse_percent(text).unwrap_or_else(|| self.zoom_percent());
        self.set_zoom(percent as f64 / 100.0);
        self.zoom_percent()
    }

    /// Pan after clamping against the given zoom.
    fn clamped(&self, pan: Pan, zoom: f64) -> Pan {
        let (w, h) = scaled_size(self.source_width, self.source_height, zoom);
        let target = self.target;
        clamp_pan(pan, w, h, target.width, target.height, self.policy)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Current zoom rounded to a whole percentage.
    pub fn zoom_percent(&self) -> i64 {
        (self.zoom * 100.0).round() as i64
    }

    pub fn pan(&self) -> Pan {
        self.pan
    }

    /// Pan clamped against the current zoom, without storing it.
    pub fn effective_pan(&self) -> Pan {
        self.clamped(self.pan, self.zoom)
    }

    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn policy(&self) -> FitPolicy {
        self.policy
    }

    pub fn target(&self) -> TargetSpec {
        self.target
    }

    pub fn source_size(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    /// Source size after scaling by the current zoom.
    pub fn scaled_size(&self) -> (f64, f64) {
        scaled_size(self.source_width, self.source_height, self.zoom)
    }
}

/// Leading-integer parse of a percentage field.
fn parse_percent(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    // Saturate absurdly long inputs; set_zoom clamps them anyway
    let value = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}


// ============================================================================
// Property-Based Tests
// ============================================================================
