//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_png`] - Encode raw RGBA pixels to PNG
//!
//! # Example
//!
//! ```typescript
//! import { encode_png } from '@gridpost/wasm';
//!
//! const imageData = ctx.getImageData(0, 0, w, h);
//! const png = encode_png(new Uint8Array(imageData.data.buffer), w, h);
//! ```

use gridpost_core::encode;
use wasm_bindgen::prelude::*;

/// Encode RGBA pixel data to PNG bytes.
///
/// # Errors
///
/// Returns an error if:
/// - Width or height is zero
/// - Pixel data length doesn't match width * height * 4
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png_pixels(pixels, width, height).map_err(|e| JsValue::from_str(&e.to_string()))
}
