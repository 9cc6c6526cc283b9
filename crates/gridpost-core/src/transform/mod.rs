//! Interactive crop state.
//!
//! Each upload slot owns one [`TransformState`]. Gestures mutate it; the
//! renderer only reads it.
//!
//! # Coordinate System
//!
//! - Zoom is the absolute linear scale from source pixels to target pixels
//! - The minimum zoom equals the policy's natural fit scale, not `1.0`
//! - Pan is in target-canvas pixels, `(0, 0)` is a centered crop
//! - Origin is top-left corner

mod state;

pub use state::TransformState;
