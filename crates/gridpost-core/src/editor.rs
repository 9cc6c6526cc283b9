//! The editor: one explicit dispatcher for every user event.
//!
//! Owns both committed rasters, the highlight slot and the open crop
//! session, and routes uploads, gestures, commits, slot selection and
//! export to the pure geometry, render, compose and export functions.
//!
//! # Upload lifecycle
//!
//! ```text
//! begin_upload(kind) ─► ticket ─► complete_upload(ticket, bytes)
//!                                     │ stale ticket   → ignored
//!                                     │ decode failure → ignored
//!                                     ▼
//!                               crop session open
//!                 set_zoom / pan_by_screen / render_crop_preview
//!                                     │
//!                   commit_crop ──────┴────── cancel_crop
//!                        │                        │
//!                 raster stored,            session dropped,
//!                 recompose if both         rasters untouched
//! ```

use crate::compose::{compose, grid_preview, slice_tiles, CompositeCanvas, Slot, Tile};
use crate::decode::{decode_image, SourceImage};
use crate::export::{export_tiles, ArchiveBundler, ExportBundle, ExportError};
use crate::layout::{GridLayout, LayoutError, SlotKind};
use crate::raster::Raster;
use crate::render::{render_commit, render_preview};
use crate::transform::TransformState;

/// Proof that an upload was started. Only the most recent ticket is honored.
///
/// Both slots share one generation counter, so starting an overlay upload
/// also makes a background upload still in flight stale; only one crop
/// session can be open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    kind: SlotKind,
    generation: u64,
}

impl UploadTicket {
    pub fn kind(&self) -> SlotKind {
        self.kind
    }
}

/// An interactive crop in progress.
#[derive(Debug, Clone)]
pub struct CropSession {
    kind: SlotKind,
    source: SourceImage,
    state: TransformState,
}

impl CropSession {
    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }
}

/// Editor state for one compositing session.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    layout: GridLayout,
    background: Option<Raster>,
    overlay: Option<Raster>,
    highlight: Slot,
    session: Option<CropSession>,
    generation: u64,
    composite: Option<CompositeCanvas>,
    tiles: Option<[Tile; 3]>,
}

impl Editor {
    /// Create an editor for `layout`.
    ///
    /// # Errors
    ///
    /// Returns the [`LayoutError`] from [`GridLayout::validate`].
    pub fn new(layout: GridLayout) -> Result<Self, LayoutError> {
        layout.validate()?;
        Ok(Self {
            layout,
            ..Self::default()
        })
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Start an upload to `kind`. Any earlier ticket becomes stale.
    pub fn begin_upload(&mut self, kind: SlotKind) -> UploadTicket {
        self.generation += 1;
        tracing::debug!(
            slot = kind.as_str(),
            generation = self.generation,
            "upload started"
        );
        UploadTicket {
            kind,
            generation: self.generation,
        }
    }

    /// Finish an upload with the file's bytes.
    ///
    /// Returns `false` without changing anything if the ticket is stale or
    /// the bytes do not decode. On success a crop session opens at minimum
    /// zoom, replacing any session already open.
    pub fn complete_upload(&mut self, ticket: UploadTicket, bytes: &[u8]) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                slot = ticket.kind.as_str(),
                generation = ticket.generation,
                latest = self.generation,
                "stale upload discarded"
            );
            return false;
        }

        let source = match decode_image(bytes) {
            Ok(source) => source,
            Err(err) => {
                tracing::debug!(slot = ticket.kind.as_str(), %err, "upload decode failed");
                return false;
            }
        };

        let state = TransformState::with_max_zoom(
            source.width,
            source.height,
            self.layout.target(ticket.kind),
            ticket.kind.policy(),
            self.layout.max_zoom,
        );

        tracing::debug!(
            slot = ticket.kind.as_str(),
            width = source.width,
            height = source.height,
            min_zoom = state.min_zoom(),
            "crop session opened"
        );
        self.session = Some(CropSession {
            kind: ticket.kind,
            source,
            state,
        });
        true
    }

    pub fn session(&self) -> Option<&CropSession> {
        self.session.as_ref()
    }

    /// Set the session's zoom. Returns the zoom actually applied.
    pub fn set_zoom(&mut self, zoom: f64) -> Option<f64> {
        let session = self.session.as_mut()?;
        session.state.set_zoom(zoom);
        Some(session.state.zoom())
    }

    /// Apply typed percent text. Returns the percent to display.
    pub fn set_zoom_percent_text(&mut self, text: &str) -> Option<i64> {
        let session = self.session.as_mut()?;
        Some(session.state.set_zoom_percent_text(text))
    }

    /// Pan by a drag delta measured in crop preview pixels.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) -> bool {
        let scale = self.layout.crop_preview_scale;
        match self.session.as_mut() {
            Some(session) => {
                session.state.pan_by_screen(dx, dy, scale);
                true
            }
            None => false,
        }
    }

    /// Render the live crop preview, writing any pan correction back.
    pub fn render_crop_preview(&mut self) -> Option<Raster> {
        let scale = self.layout.crop_preview_scale;
        let session = self.session.as_mut()?;
        session.state.normalize();
        Some(render_preview(&session.source, &session.state, scale))
    }

    /// Finalize the session into its slot's raster.
    ///
    /// Replaces any earlier raster for that slot and recomposes when both
    /// rasters exist. Returns `false` when no session is open.
    pub fn commit_crop(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };
        session.state.normalize();
        let raster = render_commit(&session.source, &session.state);

        tracing::debug!(
            slot = session.kind.as_str(),
            zoom = session.state.zoom(),
            "crop committed"
        );
        match session.kind {
            SlotKind::Background => self.background = Some(raster),
            SlotKind::Overlay => self.overlay = Some(raster),
        }
        self.recompose();
        true
    }

    /// Drop the session. Committed rasters are left as they were.
    pub fn cancel_crop(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                tracing::debug!(slot = session.kind.as_str(), "crop cancelled");
                true
            }
            None => false,
        }
    }

    /// Choose the highlighted slot and recompose when possible.
    pub fn select_slot(&mut self, slot: Slot) {
        self.highlight = slot;
        self.recompose();
    }

    pub fn highlight(&self) -> Slot {
        self.highlight
    }

    /// The committed raster for `kind`, if any.
    pub fn committed(&self, kind: SlotKind) -> Option<&Raster> {
        match kind {
            SlotKind::Background => self.background.as_ref(),
            SlotKind::Overlay => self.overlay.as_ref(),
        }
    }

    pub fn can_export(&self) -> bool {
        self.tiles.is_some()
    }

    /// Current tiles in `left, center, right` order.
    pub fn tiles(&self) -> Option<&[Tile; 3]> {
        self.tiles.as_ref()
    }

    /// Downscaled band preview of the current composite.
    pub fn grid_preview(&self) -> Option<Raster> {
        self.composite
            .as_ref()
            .map(|canvas| grid_preview(canvas, &self.layout))
    }

    /// Encode the tiles and bundle them for `date`.
    ///
    /// # Errors
    ///
    /// [`ExportError::NotReady`] until both crops are committed; otherwise
    /// whatever encoding or bundling reports.
    pub fn export(
        &self,
        date: &str,
        bundler: &mut dyn ArchiveBundler,
    ) -> Result<ExportBundle, ExportError> {
        let tiles = self.tiles.as_ref().ok_or(ExportError::NotReady)?;
        export_tiles(tiles, date, bundler)
    }

    fn recompose(&mut self) {
        let (Some(background), Some(overlay)) = (&self.background, &self.overlay) else {
            self.composite = None;
            self.tiles = None;
            return;
        };

        let canvas = compose(background, overlay, self.highlight, &self.layout);
        self.tiles = Some(slice_tiles(&canvas, &self.layout));
        self.composite = Some(canvas);
        tracing::debug!(highlight = self.highlight.as_str(), "recomposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{BundleError, NamedBuffer};
    use crate::layout::TargetSpec;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    fn small_layout() -> GridLayout {
        GridLayout {
            background: TargetSpec::new(30, 20),
            overlay: TargetSpec::new(8, 10),
            tile_width: 10,
            tile_height_standard: 14,
            tile_height_highlighted: 20,
            crop_preview_scale: 0.5,
            grid_preview_scale: 0.5,
            ..GridLayout::default()
        }
    }

    fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let raster = Raster::filled(width, height, color);
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&raster.pixels, width, height, ExtendedColorType::Rgba8)
            .unwrap();
        out
    }

    fn upload(editor: &mut Editor, kind: SlotKind, bytes: &[u8]) -> bool {
        let ticket = editor.begin_upload(kind);
        editor.complete_upload(ticket, bytes)
    }

    fn ready_editor() -> Editor {
        let mut editor = Editor::new(small_layout()).unwrap();
        let background = png_bytes(60, 40, [0, 0, 255, 255]);
        assert!(upload(&mut editor, SlotKind::Background, &background));
        assert!(editor.commit_crop());
        let overlay = png_bytes(8, 10, [255, 0, 0, 255]);
        assert!(upload(&mut editor, SlotKind::Overlay, &overlay));
        assert!(editor.commit_crop());
        editor
    }

    struct CountingBundler(usize);

    impl ArchiveBundler for CountingBundler {
        fn bundle(
            &mut self,
            files: &[NamedBuffer],
            _: &str,
        ) -> Result<Vec<u8>, BundleError> {
            self.0 += 1;
            Ok(vec![files.len() as u8])
        }
    }

    #[test]
    fn test_upload_opens_session_at_min_zoom() {
        let mut editor = Editor::new(small_layout()).unwrap();
        let bytes = png_bytes(60, 40, [9, 9, 9, 255]);
        assert!(upload(&mut editor, SlotKind::Background, &bytes));

        let session = editor.session().unwrap();
        assert_eq!(session.kind(), SlotKind::Background);
        assert!((session.state().zoom() - 0.5).abs() < 1e-12);
        assert_eq!(session.state().max_zoom(), 3.0);
    }

    #[test]
    fn test_invalid_layout_is_rejected() {
        let layout = GridLayout {
            tile_width: 2_000_000_000,
            ..small_layout()
        };
        assert!(matches!(
            Editor::new(layout),
            Err(LayoutError::Dimension { field, .. }) if field == "tileWidth"
        ));
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut editor = Editor::new(small_layout()).unwrap();
        let first = editor.begin_upload(SlotKind::Background);
        let second = editor.begin_upload(SlotKind::Overlay);

        let background = png_bytes(60, 40, [1, 1, 1, 255]);
        let overlay = png_bytes(8, 10, [1, 1, 1, 255]);
        assert!(!editor.complete_upload(first, &background));
        assert!(editor.session().is_none());
        assert!(editor.complete_upload(second, &overlay));
        assert_eq!(editor.session().unwrap().kind(), SlotKind::Overlay);
    }

    #[test]
    fn test_undecodable_upload_changes_nothing() {
        let mut editor = Editor::new(small_layout()).unwrap();
        let overlay = png_bytes(8, 10, [1, 1, 1, 255]);
        assert!(upload(&mut editor, SlotKind::Overlay, &overlay));

        assert!(!upload(&mut editor, SlotKind::Background, b"not an image"));
        assert_eq!(editor.session().unwrap().kind(), SlotKind::Overlay);
    }

    #[test]
    fn test_gestures_without_session_are_noops() {
        let mut editor = Editor::new(small_layout()).unwrap();
        assert_eq!(editor.set_zoom(2.0), None);
        assert_eq!(editor.set_zoom_percent_text("150"), None);
        assert!(!editor.pan_by_screen(5.0, 5.0));
        assert!(editor.render_crop_preview().is_none());
        assert!(!editor.commit_crop());
        assert!(!editor.cancel_crop());
    }

    #[test]
    fn test_zoom_and_pan_are_clamped() {
        let mut editor = Editor::new(small_layout()).unwrap();
        let bytes = png_bytes(60, 40, [9, 9, 9, 255]);
        upload(&mut editor, SlotKind::Background, &bytes);

        assert_eq!(editor.set_zoom(10.0), Some(3.0));
        assert_eq!(editor.set_zoom(0.1), Some(0.5));
        assert_eq!(editor.set_zoom_percent_text("100%"), Some(100));

        // 60x40 at zoom 1.0 overflows 30x20 by 15 and 10 on each side
        assert!(editor.pan_by_screen(1000.0, -1000.0));
        let pan = editor.session().unwrap().state().pan();
        assert_eq!((pan.x, pan.y), (15.0, -10.0));
    }

    #[test]
    fn test_crop_preview_uses_preview_scale() {
        let mut editor = Editor::new(small_layout()).unwrap();
        let bytes = png_bytes(16, 10, [9, 9, 9, 255]);
        upload(&mut editor, SlotKind::Overlay, &bytes);

        let preview = editor.render_crop_preview().unwrap();
        assert_eq!((preview.width, preview.height), (4, 5));
    }

    #[test]
    fn test_commit_stores_target_sized_raster() {
        let mut editor = Editor::new(small_layout()).unwrap();
        let bytes = png_bytes(60, 40, [0, 0, 255, 255]);
        upload(&mut editor, SlotKind::Background, &bytes);
        assert!(editor.commit_crop());

        let raster = editor.committed(SlotKind::Background).unwrap();
        assert_eq!((raster.width, raster.height), (30, 20));
        assert!(editor.session().is_none());
        assert!(!editor.can_export());
    }

    #[test]
    fn test_cancel_keeps_committed_raster() {
        let mut editor = ready_editor();
        let before = editor.committed(SlotKind::Overlay).cloned();

        let bytes = png_bytes(8, 10, [0, 255, 0, 255]);
        upload(&mut editor, SlotKind::Overlay, &bytes);
        assert!(editor.cancel_crop());

        assert_eq!(editor.committed(SlotKind::Overlay).cloned(), before);
        assert!(editor.can_export());
    }

    #[test]
    fn test_both_commits_compose_tiles() {
        let editor = ready_editor();
        let tiles = editor.tiles().unwrap();

        assert_eq!(editor.highlight(), Slot::Left);
        assert!(tiles[0].highlighted);
        assert_eq!(tiles[0].raster.height, 20);
        assert_eq!(tiles[1].raster.height, 14);
        assert_eq!(tiles[0].raster.pixel(1, 5), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_select_slot_recomposes() {
        let mut editor = ready_editor();
        editor.select_slot(Slot::Right);

        let tiles = editor.tiles().unwrap();
        assert!(tiles[2].highlighted);
        assert_eq!(tiles[0].raster.height, 14);
        assert_eq!(tiles[2].raster.height, 20);
    }

    #[test]
    fn test_select_slot_before_commits_only_records() {
        let mut editor = Editor::new(small_layout()).unwrap();
        editor.select_slot(Slot::Center);
        assert_eq!(editor.highlight(), Slot::Center);
        assert!(editor.tiles().is_none());
        assert!(editor.grid_preview().is_none());
    }

    #[test]
    fn test_grid_preview_after_compose() {
        let editor = ready_editor();
        let preview = editor.grid_preview().unwrap();
        assert_eq!((preview.width, preview.height), (15, 7));
    }

    #[test]
    fn test_recommit_is_deterministic() {
        let mut editor = ready_editor();
        let before = editor.tiles().cloned();
        editor.select_slot(Slot::Left);
        assert_eq!(editor.tiles().cloned(), before);
    }

    #[test]
    fn test_export_before_ready_fails() {
        let editor = Editor::new(small_layout()).unwrap();
        let mut bundler = CountingBundler(0);
        assert!(matches!(
            editor.export("2024-01-15", &mut bundler),
            Err(ExportError::NotReady)
        ));
        assert_eq!(bundler.0, 0);
    }

    #[test]
    fn test_export_bundles_three_files() {
        let editor = ready_editor();
        let mut bundler = CountingBundler(0);
        let bundle = editor.export("2024-01-15", &mut bundler).unwrap();

        assert_eq!(bundle.name, "2024-01-15_instagram-posts.zip");
        assert_eq!(bundle.bytes, vec![3]);
        assert_eq!(bundler.0, 1);
    }
}
