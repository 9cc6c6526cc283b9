//! Image encoding for export.
//!
//! This module provides functionality for:
//! - Encoding rasters to lossless PNG
//!
//! # Examples
//!
//! ```ignore
//! use gridpost_core::encode::encode_png;
//! use gridpost_core::raster::Raster;
//!
//! let tile = Raster::filled(1080, 1350, [0, 0, 0, 255]);
//! let png_bytes = encode_png(&tile).unwrap();
//! println!("Encoded {} bytes", png_bytes.len());
//! ```

mod png;

pub use png::{encode_png, encode_png_pixels, EncodeError};
