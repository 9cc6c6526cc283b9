//! RGBA8 pixel buffers.
//!
//! [`Raster`] is the single pixel container used throughout the crate:
//! decoded sources, committed crops, the composite canvas and exported tiles
//! are all rasters. Pixels are row-major, 4 bytes per pixel, straight
//! (non-premultiplied) alpha.

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// Opaque black, used to fill uncovered background regions.
pub const OPAQUE_BLACK: [u8; 4] = [0, 0, 0, 255];
/// Fully transparent, used to fill uncovered overlay regions.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// A rectangle in pixel coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// An RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Create a raster from dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * CHANNELS,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a raster with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a Raster from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Check if this is an empty/invalid raster.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Pixel at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    /// Overwrite the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        self.pixels[idx..idx + CHANNELS].copy_from_slice(&color);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// Copy a region into a new raster.
    ///
    /// The region is clipped to the raster bounds; the result may be smaller
    /// than requested (possibly empty).
    pub fn crop(&self, region: Region) -> Raster {
        let x0 = region.x.min(self.width);
        let y0 = region.y.min(self.height);
        let x1 = region.x.saturating_add(region.width).min(self.width);
        let y1 = region.y.saturating_add(region.height).min(self.height);
        let out_width = x1 - x0;
        let out_height = y1 - y0;

        let row_bytes = out_width as usize * CHANNELS;
        let mut pixels = Vec::with_capacity(row_bytes * out_height as usize);

        // Copy pixel data row by row
        for y in y0..y1 {
            let start = self.index(x0, y);
            pixels.extend_from_slice(&self.pixels[start..start + row_bytes]);
        }

        Raster {
            width: out_width,
            height: out_height,
            pixels,
        }
    }

    /// Draw `src` with its top-left corner at `(x, y)` using source-over
    /// alpha blending, touching only pixels inside `clip`.
    ///
    /// Offsets may be negative; anything outside the raster or the clip
    /// rectangle is skipped.
    pub fn draw_over(&mut self, src: &Raster, x: i64, y: i64, clip: Region) {
        let clip_x0 = i64::from(clip.x.min(self.width));
        let clip_y0 = i64::from(clip.y.min(self.height));
        let clip_x1 = i64::from(clip.x.saturating_add(clip.width).min(self.width));
        let clip_y1 = i64::from(clip.y.saturating_add(clip.height).min(self.height));

        let dst_x0 = x.max(clip_x0);
        let dst_y0 = y.max(clip_y0);
        let dst_x1 = (x + i64::from(src.width)).min(clip_x1);
        let dst_y1 = (y + i64::from(src.height)).min(clip_y1);
        if dst_x0 >= dst_x1 || dst_y0 >= dst_y1 {
            return;
        }

        for dy in dst_y0..dst_y1 {
            let sy = (dy - y) as u32;
            for dx in dst_x0..dst_x1 {
                let sx = (dx - x) as u32;
                let s_idx = src.index(sx, sy);
                let d_idx = self.index(dx as u32, dy as u32);
                let s = [
                    src.pixels[s_idx],
                    src.pixels[s_idx + 1],
                    src.pixels[s_idx + 2],
                    src.pixels[s_idx + 3],
                ];
                let d = [
                    self.pixels[d_idx],
                    self.pixels[d_idx + 1],
                    self.pixels[d_idx + 2],
                    self.pixels[d_idx + 3],
                ];
                let out = over(d, s);
                self.pixels[d_idx..d_idx + CHANNELS].copy_from_slice(&out);
            }
        }
    }

    /// Draw `src` at `(x, y)` with no clip beyond the raster bounds.
    pub fn draw(&mut self, src: &Raster, x: i64, y: i64) {
        let full = Region::new(0, 0, self.width, self.height);
        self.draw_over(src, x, y, full);
    }
}

/// Source-over compositing of straight-alpha RGBA8 pixels.
pub fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    let sa = u32::from(src[3]);
    let inv = 255 - sa;

    if dst[3] == 255 {
        // Opaque destination stays opaque
        let mut out = [0u8; 4];
        for i in 0..3 {
            out[i] = ((u32::from(src[i]) * sa + u32::from(dst[i]) * inv + 127) / 255) as u8;
        }
        out[3] = 255;
        return out;
    }

    // out_a = sa + da * (1 - sa), scaled by 255
    let da_scaled = u32::from(dst[3]) * inv;
    let out_a_scaled = sa * 255 + da_scaled;
    if out_a_scaled == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * sa * 255 + u32::from(dst[i]) * da_scaled;
        out[i] = ((num + out_a_scaled / 2) / out_a_scaled).min(255) as u8;
    }
    out[3] = ((out_a_scaled + 127) / 255).min(255) as u8;
    out
}
