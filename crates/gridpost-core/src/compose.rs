//! Tile compositing.
//!
//! Combines the committed background and overlay into one composite canvas
//! three tiles wide, then slices it into the three exported tiles. The
//! highlighted tile keeps the full background height and is the only tile
//! carrying the overlay; the other two are the vertically centered band at
//! the standard tile height.
//!
//! Everything here is a pure function of its inputs: recomposing unchanged
//! rasters with an unchanged highlight yields byte-identical tiles.

use serde::{Deserialize, Serialize};

use crate::decode::{resize, FilterType};
use crate::layout::GridLayout;
use crate::raster::{Raster, Region, TRANSPARENT};

/// Divider guide color on the grid preview.
const GUIDE_COLOR: [u8; 4] = [255, 255, 255, 255];
/// Divider guide stroke width in preview pixels.
const GUIDE_WIDTH: u32 = 2;
/// Dash pattern of the divider guides: pixels on, then pixels off.
const GUIDE_DASH: (u32, u32) = (5, 5);

/// One horizontal third of the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

impl Slot {
    /// All slots in left-to-right order.
    pub const ALL: [Slot; 3] = [Slot::Left, Slot::Center, Slot::Right];

    /// Column index, `0` for left.
    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn from_index(index: u32) -> Option<Slot> {
        match index {
            0 => Some(Slot::Left),
            1 => Some(Slot::Center),
            2 => Some(Slot::Right),
            _ => None,
        }
    }

    /// Numeric file suffix. Counted from the right: downstream consumers
    /// post the files in this order.
    pub fn file_number(self) -> u32 {
        match self {
            Slot::Right => 1,
            Slot::Center => 2,
            Slot::Left => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Left => "left",
            Slot::Center => "center",
            Slot::Right => "right",
        }
    }

    pub fn parse(name: &str) -> Option<Slot> {
        match name {
            "left" => Some(Slot::Left),
            "center" => Some(Slot::Center),
            "right" => Some(Slot::Right),
            _ => None,
        }
    }
}

/// The full-size working canvas: background with the overlay drawn in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeCanvas {
    pub raster: Raster,
    pub highlight: Slot,
}

/// One exported raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub slot: Slot,
    pub highlighted: bool,
    pub raster: Raster,
}

impl Tile {
    /// `{date}_{n}.png`, with `_reel` before the extension when highlighted.
    pub fn file_name(&self, date: &str) -> String {
        tile_file_name(date, self.slot, self.highlighted)
    }
}

/// File name of one exported tile.
pub fn tile_file_name(date: &str, slot: Slot, highlighted: bool) -> String {
    let suffix = if highlighted { "_reel" } else { "" };
    format!("{}_{}{}.png", date, slot.file_number(), suffix)
}

/// File name of the exported bundle.
pub fn archive_name(date: &str) -> String {
    format!("{}_instagram-posts.zip", date)
}

/// Top-left corner of the overlay inside the composite.
///
/// The overlay is centered horizontally in the highlighted column and
/// vertically in the full background height. Integer division floors.
pub fn poster_origin(highlight: Slot, layout: &GridLayout) -> (i64, i64) {
    let tile_width = i64::from(layout.tile_width);
    let x = i64::from(highlight.index()) * tile_width + tile_width / 2
        - i64::from(layout.overlay.width) / 2;
    let y = (i64::from(layout.background.height) - i64::from(layout.overlay.height)) / 2;
    (x, y)
}

/// Column of the composite owned by `slot`, full height.
fn column(slot: Slot, layout: &GridLayout) -> Region {
    Region::new(
        slot.index() * layout.tile_width,
        0,
        layout.tile_width,
        layout.background.height,
    )
}

/// Build the composite canvas.
///
/// The background is drawn at `(0, 0)` at native size; the overlay is then
/// blended source-over at [`poster_origin`], clipped to the highlighted
/// column so it never spills onto a neighboring tile.
#[tracing::instrument(skip_all, fields(highlight = highlight.as_str()))]
pub fn compose(
    background: &Raster,
    overlay: &Raster,
    highlight: Slot,
    layout: &GridLayout,
) -> CompositeCanvas {
    let mut raster = Raster::filled(
        layout.composite_width(),
        layout.background.height,
        TRANSPARENT,
    );
    raster.draw(background, 0, 0);

    let (x, y) = poster_origin(highlight, layout);
    raster.draw_over(overlay, x, y, column(highlight, layout));

    CompositeCanvas { raster, highlight }
}

/// Slice the composite into tiles, in `left, center, right` order.
pub fn slice_tiles(canvas: &CompositeCanvas, layout: &GridLayout) -> [Tile; 3] {
    Slot::ALL.map(|slot| {
        let highlighted = slot == canvas.highlight;
        let region = if highlighted {
            Region::new(
                slot.index() * layout.tile_width,
                0,
                layout.tile_width,
                layout.tile_height_highlighted,
            )
        } else {
            Region::new(
                slot.index() * layout.tile_width,
                layout.standard_band_top(),
                layout.tile_width,
                layout.tile_height_standard,
            )
        };
        Tile {
            slot,
            highlighted,
            raster: canvas.raster.crop(region),
        }
    })
}

/// The standard-height band across the full composite width.
pub fn preview_band(canvas: &CompositeCanvas, layout: &GridLayout) -> Raster {
    canvas.raster.crop(Region::new(
        0,
        layout.standard_band_top(),
        layout.composite_width(),
        layout.tile_height_standard,
    ))
}

/// Downscaled preview band with dashed guides at the tile boundaries.
///
/// Presentation only; never exported.
pub fn grid_preview(canvas: &CompositeCanvas, layout: &GridLayout) -> Raster {
    let band = preview_band(canvas, layout);
    let scale = if layout.grid_preview_scale.is_finite() && layout.grid_preview_scale > 0.0 {
        layout.grid_preview_scale
    } else {
        1.0
    };
    let width = ((band.width as f64 * scale).floor() as u32).max(1);
    let height = ((band.height as f64 * scale).floor() as u32).max(1);

    let mut preview = match resize(&band, width, height, FilterType::Bilinear) {
        Ok(preview) => preview,
        Err(err) => {
            tracing::warn!(%err, "grid preview resize failed, using full-size band");
            band
        }
    };

    for boundary in 1..3u32 {
        let x = (f64::from(boundary * layout.tile_width) * scale).round() as u32;
        draw_dashed_guide(&mut preview, x);
    }
    preview
}

/// Vertical dashed line centered on column `x`.
fn draw_dashed_guide(raster: &mut Raster, x: u32) {
    let (on, off) = GUIDE_DASH;
    let left = x.saturating_sub(GUIDE_WIDTH / 2);
    for y in 0..raster.height {
        if y % (on + off) >= on {
            continue;
        }
        for gx in left..left + GUIDE_WIDTH {
            raster.put_pixel(gx, y, GUIDE_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TargetSpec;
    use crate::raster::OPAQUE_BLACK;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    /// Scaled-down layout so tests stay fast.
    fn small_layout() -> GridLayout {
        GridLayout {
            background: TargetSpec::new(30, 20),
            overlay: TargetSpec::new(8, 10),
            tile_width: 10,
            tile_height_standard: 14,
            tile_height_highlighted: 20,
            grid_preview_scale: 0.5,
            ..GridLayout::default()
        }
    }

    /// Background whose pixels encode their position.
    fn coded_background(layout: &GridLayout) -> Raster {
        let (w, h) = (layout.background.width, layout.background.height);
        let mut pixels = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            for x in 0..w {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        Raster::new(w, h, pixels)
    }

    #[test]
    fn test_slot_file_numbers_reversed() {
        assert_eq!(Slot::Right.file_number(), 1);
        assert_eq!(Slot::Center.file_number(), 2);
        assert_eq!(Slot::Left.file_number(), 3);
    }

    #[test]
    fn test_slot_index_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(Slot::from_index(slot.index()), Some(slot));
            assert_eq!(Slot::parse(slot.as_str()), Some(slot));
        }
        assert_eq!(Slot::from_index(3), None);
        assert_eq!(Slot::parse("middle"), None);
        assert_eq!(Slot::default(), Slot::Left);
    }

    #[test]
    fn test_tile_names_for_center_highlight() {
        let names: Vec<String> = Slot::ALL
            .iter()
            .map(|&slot| {
                tile_file_name("2024-01-15", slot, slot == Slot::Center)
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "2024-01-15_3.png",
                "2024-01-15_2_reel.png",
                "2024-01-15_1.png",
            ]
        );
    }

    #[test]
    fn test_archive_name() {
        assert_eq!(archive_name("2024-01-15"), "2024-01-15_instagram-posts.zip");
    }

    #[test]
    fn test_poster_origin_default_layout() {
        let layout = GridLayout::default();
        assert_eq!(poster_origin(Slot::Left, &layout), (145, 399));
        assert_eq!(poster_origin(Slot::Center, &layout), (1225, 399));
        assert_eq!(poster_origin(Slot::Right, &layout), (2305, 399));
    }

    #[test]
    fn test_poster_origin_floors_odd_sizes() {
        let layout = GridLayout {
            overlay: TargetSpec::new(7, 9),
            ..small_layout()
        };
        // 5 - 3 and (20 - 9) / 2
        assert_eq!(poster_origin(Slot::Left, &layout), (2, 5));
    }

    #[test]
    fn test_tile_sizes_for_left_highlight() {
        let layout = GridLayout::default();
        let background = Raster::filled(3240, 1920, OPAQUE_BLACK);
        let overlay = Raster::filled(790, 1122, RED);
        let canvas = compose(&background, &overlay, Slot::Left, &layout);
        let tiles = slice_tiles(&canvas, &layout);

        let sizes: Vec<(u32, u32)> = tiles
            .iter()
            .map(|tile| (tile.raster.width, tile.raster.height))
            .collect();
        assert_eq!(sizes, vec![(1080, 1920), (1080, 1350), (1080, 1350)]);
        assert!(tiles[0].highlighted);
        assert!(!tiles[1].highlighted && !tiles[2].highlighted);
    }

    #[test]
    fn test_overlay_only_on_highlighted_tile() {
        let layout = small_layout();
        let background = Raster::filled(30, 20, BLUE);
        let overlay = Raster::filled(8, 10, RED);
        let canvas = compose(&background, &overlay, Slot::Center, &layout);
        let tiles = slice_tiles(&canvas, &layout);

        // Overlay spans x 11..19, y 5..15 in the composite
        assert_eq!(canvas.raster.pixel(11, 5), Some(RED));
        assert_eq!(canvas.raster.pixel(18, 14), Some(RED));
        assert_eq!(canvas.raster.pixel(10, 5), Some(BLUE));
        assert_eq!(canvas.raster.pixel(11, 15), Some(BLUE));

        let center = &tiles[1].raster;
        assert_eq!(center.pixel(1, 5), Some(RED));
        assert_eq!(center.pixel(0, 0), Some(BLUE));
        for tile in [&tiles[0], &tiles[2]] {
            assert!(tile.raster.pixels.chunks(4).all(|p| p == BLUE));
        }
    }

    #[test]
    fn test_overlay_clipped_to_column() {
        let layout = GridLayout {
            overlay: TargetSpec::new(14, 10),
            ..small_layout()
        };
        let background = Raster::filled(30, 20, BLUE);
        let overlay = Raster::filled(14, 10, RED);
        let canvas = compose(&background, &overlay, Slot::Center, &layout);

        // Overlay would span x 8..22 but stays inside column 10..20
        assert_eq!(canvas.raster.pixel(9, 10), Some(BLUE));
        assert_eq!(canvas.raster.pixel(10, 10), Some(RED));
        assert_eq!(canvas.raster.pixel(19, 10), Some(RED));
        assert_eq!(canvas.raster.pixel(20, 10), Some(BLUE));
    }

    #[test]
    fn test_transparent_overlay_areas_show_background() {
        let layout = small_layout();
        let background = Raster::filled(30, 20, BLUE);
        let mut overlay = Raster::filled(8, 10, RED);
        overlay.put_pixel(0, 0, TRANSPARENT);
        let canvas = compose(&background, &overlay, Slot::Left, &layout);

        assert_eq!(canvas.raster.pixel(1, 5), Some(BLUE));
        assert_eq!(canvas.raster.pixel(2, 5), Some(RED));
    }

    #[test]
    fn test_standard_tiles_are_centered_band() {
        let layout = small_layout();
        let background = coded_background(&layout);
        let overlay = Raster::filled(8, 10, TRANSPARENT);
        let canvas = compose(&background, &overlay, Slot::Right, &layout);
        let tiles = slice_tiles(&canvas, &layout);

        // Band top is (20 - 14) / 2 = 3
        assert_eq!(tiles[0].raster.pixel(0, 0), Some([0, 3, 0, 255]));
        assert_eq!(tiles[1].raster.pixel(0, 0), Some([10, 3, 0, 255]));
        assert_eq!(tiles[1].raster.pixel(9, 13), Some([19, 16, 0, 255]));
        assert_eq!(tiles[2].raster.pixel(0, 0), Some([20, 0, 0, 255]));
        assert_eq!(tiles[2].raster.height, 20);
    }

    #[test]
    fn test_recompose_is_deterministic() {
        let layout = small_layout();
        let background = coded_background(&layout);
        let mut overlay = Raster::filled(8, 10, [10, 200, 30, 128]);
        overlay.put_pixel(3, 3, TRANSPARENT);

        let first = compose(&background, &overlay, Slot::Center, &layout);
        let second = compose(&background, &overlay, Slot::Center, &layout);
        let first = slice_tiles(&first, &layout);
        let second = slice_tiles(&second, &layout);
        assert_eq!(first, second);
    }

    #[test]
    fn test_preview_band_size() {
        let layout = small_layout();
        let canvas = compose(
            &coded_background(&layout),
            &Raster::filled(8, 10, RED),
            Slot::Left,
            &layout,
        );
        let band = preview_band(&canvas, &layout);
        assert_eq!((band.width, band.height), (30, 14));
        assert_eq!(band.pixel(0, 0), Some([0, 3, 0, 255]));
    }

    #[test]
    fn test_grid_preview_dimensions_and_guides() {
        let layout = GridLayout::default();
        let canvas = compose(
            &Raster::filled(3240, 1920, OPAQUE_BLACK),
            &Raster::filled(790, 1122, OPAQUE_BLACK),
            Slot::Center,
            &layout,
        );
        let preview = grid_preview(&canvas, &layout);

        // 3240x1350 at 0.25
        assert_eq!((preview.width, preview.height), (810, 337));
        // Guides at 270 and 540, 2px wide, 5 on / 5 off
        for x in [269, 270, 539, 540] {
            assert_eq!(preview.pixel(x, 0), Some(GUIDE_COLOR));
            assert_eq!(preview.pixel(x, 4), Some(GUIDE_COLOR));
            assert_eq!(preview.pixel(x, 5), Some(OPAQUE_BLACK));
            assert_eq!(preview.pixel(x, 10), Some(GUIDE_COLOR));
        }
        assert_eq!(preview.pixel(268, 0), Some(OPAQUE_BLACK));
        assert_eq!(preview.pixel(271, 0), Some(OPAQUE_BLACK));
    }
}
