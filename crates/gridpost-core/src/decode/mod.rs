//! Image decoding for uploads.
//!
//! This module provides functionality for:
//! - Decoding JPEG, PNG, GIF, WebP and BMP uploads to RGBA
//! - Applying EXIF orientation so the user crops what they see
//! - Resizing rasters for previews and commit prefiltering
//!
//! # Architecture
//!
//! Decoding is synchronous. In the browser the bytes arrive asynchronously
//! from a file reader; the editor's upload tickets make sure a decode that
//! finishes after a newer upload started is discarded.
//!
//! # Examples
//!
//! ```ignore
//! use gridpost_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod resize;
mod source;
mod types;

pub use resize::resize;
pub use source::decode_image;
pub use types::{DecodeError, FilterType, Orientation, SourceImage};
