//! Browser side of export: the JS archive bundler and the download URL.
//!
//! The bundler is a plain JS function so the page can use whichever zip
//! library it already ships. It is called synchronously:
//!
//! ```typescript
//! import { zipSync } from 'fflate';
//!
//! const bundle = editor.export(today(), (files, bundleName) =>
//!   zipSync(Object.fromEntries(files.map((f) => [f.name, f.bytes]))),
//! );
//! const url = bundle_object_url(bundle.bytes());
//! ```

use gridpost_core::export::{ArchiveBundler, BundleError, ExportBundle, NamedBuffer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// MIME type of the downloaded bundle.
const BUNDLE_MIME: &str = "application/zip";

/// [`ArchiveBundler`] backed by a JS callback
/// `(files: {name: string, bytes: Uint8Array}[], bundleName: string) => Uint8Array`.
pub(crate) struct JsArchiveBundler<'a> {
    callback: &'a js_sys::Function,
}

impl<'a> JsArchiveBundler<'a> {
    pub(crate) fn new(callback: &'a js_sys::Function) -> Self {
        Self { callback }
    }
}

impl ArchiveBundler for JsArchiveBundler<'_> {
    fn bundle(&mut self, files: &[NamedBuffer], bundle_name: &str) -> Result<Vec<u8>, BundleError> {
        let list = js_sys::Array::new();
        for file in files {
            let entry = js_sys::Object::new();
            js_sys::Reflect::set(&entry, &"name".into(), &JsValue::from_str(&file.name))
                .map_err(bundle_error)?;
            js_sys::Reflect::set(
                &entry,
                &"bytes".into(),
                &js_sys::Uint8Array::from(file.bytes.as_slice()),
            )
            .map_err(bundle_error)?;
            list.push(&entry);
        }

        let result = self
            .callback
            .call2(&JsValue::NULL, &list, &JsValue::from_str(bundle_name))
            .map_err(bundle_error)?;
        let bytes = result
            .dyn_into::<js_sys::Uint8Array>()
            .map_err(|_| BundleError("bundler must return a Uint8Array".to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn bundle_error(value: JsValue) -> BundleError {
    BundleError(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

/// A finished export for JavaScript.
#[wasm_bindgen]
pub struct JsExportBundle {
    name: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl JsExportBundle {
    /// Suggested download file name, `{date}_instagram-posts.zip`.
    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.name.clone()
    }

    /// Bundle bytes as a Uint8Array copy.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl From<ExportBundle> for JsExportBundle {
    fn from(bundle: ExportBundle) -> Self {
        Self {
            name: bundle.name,
            bytes: bundle.bytes,
        }
    }
}

/// Today's date as `YYYY-MM-DD` (UTC), the file name prefix for exports.
#[wasm_bindgen]
pub fn today() -> String {
    let iso = String::from(js_sys::Date::new_0().to_iso_string());
    date_prefix(&iso).to_string()
}

fn date_prefix(iso: &str) -> &str {
    iso.split('T').next().unwrap_or(iso)
}

/// Create an object URL for downloading bundle bytes.
///
/// The caller revokes it with `URL.revokeObjectURL` after the download
/// starts.
#[wasm_bindgen]
pub fn bundle_object_url(bytes: &[u8]) -> Result<String, JsValue> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));

    let options = web_sys::BlobPropertyBag::new();
    options.set_type(BUNDLE_MIME);

    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    web_sys::Url::create_object_url_with_blob(&blob)
}
