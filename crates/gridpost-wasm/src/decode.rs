//! Image decoding WASM bindings.
//!
//! # Functions
//!
//! - [`decode_image`] - Decode a JPEG, PNG, GIF, WebP or BMP upload to RGBA
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@gridpost/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const image = decode_image(bytes);
//! console.log(`Decoded ${image.width}x${image.height}`);
//! ```

use crate::types::JsRaster;
use gridpost_core::decode;
use wasm_bindgen::prelude::*;

/// Decode an uploaded image from bytes.
///
/// The format is detected from the file contents. EXIF orientation is
/// applied so the raster is upright.
///
/// # Errors
///
/// Returns an error if:
/// - The bytes are not a supported image format
/// - The file is corrupted or truncated
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRaster, JsValue> {
    decode::decode_image(bytes)
        .map(JsRaster::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
