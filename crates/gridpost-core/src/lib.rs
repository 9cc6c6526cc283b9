//! Gridpost Core - crop, composite and tile library
//!
//! This crate provides the core functionality for Gridpost: turning a wide
//! background photo and a portrait overlay into three Instagram grid tiles.
//!
//! # Module Structure
//!
//! - `geometry` - Fit scale, zoom bounds and pan clamping
//! - `transform` - Per-slot interactive zoom/pan state
//! - `render` - Transform state to fixed-size raster, preview or commit
//! - `compose` - Composite canvas, tile slicing and file naming
//! - `export` - PNG encoding of tiles and hand-off to an archive bundler
//! - `editor` - Event dispatcher tying uploads, gestures and export together
//! - `decode` / `encode` - Bytes to raster and back
//! - `layout` - Target sizes and presentation scales
//!
//! # Data Flow
//!
//! ```text
//! bytes ─► decode ─► TransformState::new ─► gestures ─► render (preview)
//!                                                  └──► render (commit)
//! background + overlay rasters ─► compose ─► slice_tiles ─► export
//! ```

pub mod compose;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod raster;
pub mod render;
pub mod transform;

pub use compose::{archive_name, compose, slice_tiles, tile_file_name, CompositeCanvas, Slot, Tile};
pub use editor::{CropSession, Editor, UploadTicket};
pub use export::{export_tiles, ArchiveBundler, BundleError, ExportBundle, ExportError, NamedBuffer};
pub use geometry::{clamp_pan, min_zoom_for, FitPolicy, Pan, MAX_ZOOM};
pub use layout::{GridLayout, LayoutError, SlotKind, TargetSpec};
pub use raster::Raster;
pub use render::{render, render_commit, render_preview, InterpolationFilter, Resolution};
pub use transform::TransformState;
