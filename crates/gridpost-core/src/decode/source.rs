//! Image decoding with EXIF orientation handling.
//!
//! Accepts any format the `image` crate is built with here (JPEG, PNG, GIF,
//! WebP, BMP); the format is guessed from the leading bytes, not from a
//! file name or MIME type.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::ImageReader;

use super::{DecodeError, Orientation, SourceImage};
use crate::raster::Raster;

/// Decode image bytes into an RGBA source, applying EXIF orientation.
///
/// # Arguments
///
/// * `bytes` - Raw file bytes in any supported format
///
/// # Returns
///
/// A `SourceImage` with RGBA pixel data and correct orientation applied.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be recognized.
/// Returns `DecodeError::CorruptedFile` if the data is corrupted or truncated.
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    // First, extract EXIF orientation before decoding
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let oriented = orientation.apply(img);
    let source = Raster::from_rgba_image(oriented.into_rgba8());

    if source.is_empty() {
        return Err(DecodeError::CorruptedFile("image has no pixels".to_string()));
    }

    Ok(source)
}

/// Extract EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}
