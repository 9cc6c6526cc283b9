//! WASM bindings for the editor.
//!
//! One `JsEditor` backs the whole page. Every UI event maps to one method;
//! the page re-reads `state()` and the preview rasters afterwards.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const editor = new JsEditor({ cropPreviewScale: 0.3 });
//!
//! const ticket = editor.begin_upload("background");
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! if (editor.complete_upload(ticket, bytes)) {
//!   draw(editor.render_crop_preview());
//! }
//!
//! editor.set_zoom(1.5);
//! editor.pan_by_screen(dx, dy);
//! editor.commit_crop();
//! ```

use gridpost_core::compose::Slot;
use gridpost_core::editor::{Editor, UploadTicket};
use gridpost_core::layout::{GridLayout, LayoutError, SlotKind};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::export::{JsArchiveBundler, JsExportBundle};
use crate::types::JsRaster;

/// Opaque handle returned by `begin_upload`.
#[wasm_bindgen]
#[derive(Clone)]
pub struct JsUploadTicket {
    inner: UploadTicket,
}

#[wasm_bindgen]
impl JsUploadTicket {
    /// `"background"` or `"overlay"`.
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> String {
        self.inner.kind().as_str().to_string()
    }
}

/// Snapshot of the open crop session for the UI.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct SessionSnapshot {
    kind: SlotKind,
    zoom: f64,
    zoom_percent: i64,
    min_zoom: f64,
    max_zoom: f64,
    pan_x: f64,
    pan_y: f64,
}

/// Snapshot of the whole editor for the UI.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct EditorSnapshot {
    highlight: Slot,
    has_background: bool,
    has_overlay: bool,
    can_export: bool,
    session: Option<SessionSnapshot>,
}

/// The editor exposed to JavaScript.
#[wasm_bindgen]
pub struct JsEditor {
    inner: Editor,
}

#[wasm_bindgen]
impl JsEditor {
    /// Create an editor.
    ///
    /// `layout` is an optional object overriding any `GridLayout` field,
    /// e.g. `{ gridPreviewScale: 0.5 }`. Omitted fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `layout` is present but does not deserialize, or
    /// has a size or scale out of range.
    #[wasm_bindgen(constructor)]
    pub fn new(layout: JsValue) -> Result<JsEditor, JsValue> {
        let layout = if layout.is_undefined() || layout.is_null() {
            GridLayout::default()
        } else {
            serde_wasm_bindgen::from_value(layout)
                .map_err(|e| JsValue::from_str(&format!("Invalid layout: {}", e)))?
        };
        JsEditor::with_layout(layout)
            .map_err(|e| JsValue::from_str(&format!("Invalid layout: {}", e)))
    }

    /// Start an upload to `"background"` or `"overlay"`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown slot kind.
    pub fn begin_upload(&mut self, kind: &str) -> Result<JsUploadTicket, JsValue> {
        let kind = parse_kind(kind)?;
        Ok(JsUploadTicket {
            inner: self.inner.begin_upload(kind),
        })
    }

    /// Finish an upload. Returns `false` for stale tickets and files that
    /// are not images; nothing changes in either case.
    pub fn complete_upload(&mut self, ticket: &JsUploadTicket, bytes: &[u8]) -> bool {
        self.inner.complete_upload(ticket.inner, bytes)
    }

    /// Set the zoom of the open crop. Returns the applied zoom.
    pub fn set_zoom(&mut self, zoom: f64) -> Option<f64> {
        self.inner.set_zoom(zoom)
    }

    /// Apply typed percent text. Returns the percent to display.
    pub fn set_zoom_percent_text(&mut self, text: &str) -> Option<i32> {
        self.inner
            .set_zoom_percent_text(text)
            .map(|percent| {
                percent.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
            })
    }

    /// Pan the open crop by a drag delta in preview pixels.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) -> bool {
        self.inner.pan_by_screen(dx, dy)
    }

    /// Live preview of the open crop.
    pub fn render_crop_preview(&mut self) -> Option<JsRaster> {
        self.inner.render_crop_preview().map(JsRaster::from_raster)
    }

    pub fn commit_crop(&mut self) -> bool {
        self.inner.commit_crop()
    }

    pub fn cancel_crop(&mut self) -> bool {
        self.inner.cancel_crop()
    }

    /// Choose `"left"`, `"center"` or `"right"` as the highlighted slot.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown slot name.
    pub fn select_slot(&mut self, slot: &str) -> Result<(), JsValue> {
        let slot = parse_slot(slot)?;
        self.inner.select_slot(slot);
        Ok(())
    }

    pub fn can_export(&self) -> bool {
        self.inner.can_export()
    }

    /// Tile at `index` (0 = left), once both crops are committed.
    pub fn tile(&self, index: u32) -> Option<JsRaster> {
        let slot = Slot::from_index(index)?;
        self.inner
            .tiles()
            .and_then(|tiles| tiles.iter().find(|tile| tile.slot == slot))
            .map(|tile| JsRaster::from_raster(tile.raster.clone()))
    }

    /// File name the tile at `index` will be exported under.
    pub fn tile_name(&self, index: u32, date: &str) -> Option<String> {
        let slot = Slot::from_index(index)?;
        self.inner
            .tiles()
            .and_then(|tiles| tiles.iter().find(|tile| tile.slot == slot))
            .map(|tile| tile.file_name(date))
    }

    /// Downscaled band preview with tile guides.
    pub fn grid_preview(&self) -> Option<JsRaster> {
        self.inner.grid_preview().map(JsRaster::from_raster)
    }

    /// Plain object describing the current editor state.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.snapshot())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Encode the tiles and hand them to `bundler`.
    ///
    /// `bundler` is called as `bundler(files, bundleName)` where `files` is
    /// `{name: string, bytes: Uint8Array}[]`, and must return a Uint8Array.
    ///
    /// # Errors
    ///
    /// Returns an error if either crop is missing, encoding fails, or the
    /// bundler throws or returns something else.
    pub fn export(
        &self,
        date: &str,
        bundler: &js_sys::Function,
    ) -> Result<JsExportBundle, JsValue> {
        let mut bundler = JsArchiveBundler::new(bundler);
        self.inner
            .export(date, &mut bundler)
            .map(JsExportBundle::from)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl JsEditor {
    pub(crate) fn with_layout(layout: GridLayout) -> Result<Self, LayoutError> {
        Ok(Self {
            inner: Editor::new(layout)?,
        })
    }

    fn snapshot(&self) -> EditorSnapshot {
        let session = self.inner.session().map(|session| {
            let state = session.state();
            SessionSnapshot {
                kind: session.kind(),
                zoom: state.zoom(),
                zoom_percent: state.zoom_percent(),
                min_zoom: state.min_zoom(),
                max_zoom: state.max_zoom(),
                pan_x: state.pan().x,
                pan_y: state.pan().y,
            }
        });
        EditorSnapshot {
            highlight: self.inner.highlight(),
            has_background: self.inner.committed(SlotKind::Background).is_some(),
            has_overlay: self.inner.committed(SlotKind::Overlay).is_some(),
            can_export: self.inner.can_export(),
            session,
        }
    }
}

fn parse_kind(name: &str) -> Result<SlotKind, JsValue> {
    SlotKind::parse(name).ok_or_else(|| {
        JsValue::from_str(&format!("Unknown slot kind: {}", name))
    })
}

fn parse_slot(name: &str) -> Result<Slot, JsValue> {
    Slot::parse(name).ok_or_else(|| JsValue::from_str(&format!("Unknown slot: {}", name)))
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_new_without_layout() {
        let editor = JsEditor::new(JsValue::UNDEFINED).unwrap();
        assert!(!editor.can_export());
    }

    #[wasm_bindgen_test]
    fn test_new_with_partial_layout() {
        let layout = js_sys::Object::new();
        let scale = JsValue::from_f64(0.5);
        js_sys::Reflect::set(&layout, &"gridPreviewScale".into(), &scale).unwrap();
        assert!(JsEditor::new(layout.into()).is_ok());
    }

    #[wasm_bindgen_test]
    fn test_new_with_huge_tile_width_errors() {
        let layout = js_sys::Object::new();
        let width = JsValue::from_f64(2_000_000_000.0);
        js_sys::Reflect::set(&layout, &"tileWidth".into(), &width).unwrap();
        assert!(JsEditor::new(layout.into()).is_err());
    }

    #[wasm_bindgen_test]
    fn test_unknown_names_error() {
        let mut editor = JsEditor::new(JsValue::NULL).unwrap();
        assert!(editor.begin_upload("poster").is_err());
        assert!(editor.select_slot("middle").is_err());
    }

    #[wasm_bindgen_test]
    fn test_export_before_ready_errors() {
        let editor = JsEditor::new(JsValue::NULL).unwrap();
        let bundler = js_sys::Function::new_with_args("files, name", "return new Uint8Array();");
        assert!(editor.export("2024-01-15", &bundler).is_err());
    }

    #[wasm_bindgen_test]
    fn test_state_is_object() {
        let editor = JsEditor::new(JsValue::NULL).unwrap();
        let state = editor.state().unwrap();
        let highlight = js_sys::Reflect::get(&state, &"highlight".into()).unwrap();
        assert_eq!(highlight.as_string().as_deref(), Some("left"));
    }
}
