//! Gridpost WASM - WebAssembly bindings for Gridpost
//!
//! This crate provides WASM bindings to expose the gridpost-core functionality
//! to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `editor` - The editor: uploads, crop gestures, slot selection, export
//! - `export` - JS archive bundler adapter, date stamp and download URL
//! - `geometry` - Fit/zoom helpers for sizing controls
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding bindings
//! - `encode` - PNG encoding bindings
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditor, today, bundle_object_url } from '@gridpost/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const editor = new JsEditor();
//! // ...uploads and commits...
//! const bundle = editor.export(today(), bundler);
//! link.href = bundle_object_url(bundle.bytes());
//! link.download = bundle.name;
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod editor;
mod encode;
mod export;
mod geometry;
mod types;

// Re-export public types
pub use decode::decode_image;
pub use editor::{JsEditor, JsUploadTicket};
pub use encode::encode_png;
pub use export::{bundle_object_url, today, JsExportBundle};
pub use geometry::{max_zoom, min_zoom_for};
pub use types::JsRaster;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
