//! Export orchestration: tiles → named PNG buffers → one bundle.
//!
//! The archive format itself belongs to an external collaborator behind
//! [`ArchiveBundler`]. The orchestrator encodes every tile first and only
//! hands over a complete file list; any failure is terminal and nothing is
//! bundled.

use thiserror::Error;

use crate::compose::{archive_name, Tile};
use crate::encode::{encode_png, EncodeError};

/// One file handed to the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBuffer {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Failure reported by an [`ArchiveBundler`].
#[derive(Debug, Error)]
#[error("Bundling failed: {0}")]
pub struct BundleError(pub String);

/// Packs named byte buffers into one downloadable byte stream.
pub trait ArchiveBundler {
    fn bundle(
        &mut self,
        files: &[NamedBuffer],
        bundle_name: &str,
    ) -> Result<Vec<u8>, BundleError>;
}

/// The finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    /// Suggested download file name.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Both crops must be committed before tiles exist.
    #[error("Nothing to export: background and overlay must both be committed")]
    NotReady,

    /// A tile could not be encoded.
    #[error("Failed to encode {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: EncodeError,
    },

    /// The bundler rejected the file list.
    #[error(transparent)]
    Bundle(#[from] BundleError),
}

/// Encode tiles to PNG and name them for `date`.
///
/// # Errors
///
/// Stops at the first tile that fails to encode.
pub fn encode_tiles(tiles: &[Tile], date: &str) -> Result<Vec<NamedBuffer>, ExportError> {
    tiles
        .iter()
        .map(|tile| {
            let name = tile.file_name(date);
            match encode_png(&tile.raster) {
                Ok(bytes) => Ok(NamedBuffer { name, bytes }),
                Err(source) => Err(ExportError::Encode { name, source }),
            }
        })
        .collect()
}

/// Encode all tiles and bundle them as `{date}_instagram-posts.zip`.
///
/// # Errors
///
/// Returns [`ExportError::NotReady`] for an empty tile set, otherwise the
/// first encode failure or the bundler's failure. The bundler is never
/// called with a partial file list.
#[tracing::instrument(skip(tiles, bundler), fields(tiles = tiles.len()))]
pub fn export_tiles(
    tiles: &[Tile],
    date: &str,
    bundler: &mut dyn ArchiveBundler,
) -> Result<ExportBundle, ExportError> {
    if tiles.is_empty() {
        return Err(ExportError::NotReady);
    }

    let files = encode_tiles(tiles, date)?;
    let name = archive_name(date);
    let bytes = bundler.bundle(&files, &name)?;

    tracing::debug!(bundle = %name, bytes = bytes.len(), "export bundled");
    Ok(ExportBundle { name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Slot;
    use crate::raster::Raster;

    /// Records what it was given and returns the concatenated names.
    #[derive(Default)]
    struct RecordingBundler {
        calls: Vec<(Vec<String>, String)>,
    }

    impl ArchiveBundler for RecordingBundler {
        fn bundle(
            &mut self,
            files: &[NamedBuffer],
            bundle_name: &str,
        ) -> Result<Vec<u8>, BundleError> {
            let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
            let joined = names.join(",").into_bytes();
            self.calls.push((names, bundle_name.to_string()));
            Ok(joined)
        }
    }

    struct FailingBundler;

    impl ArchiveBundler for FailingBundler {
        fn bundle(&mut self, _: &[NamedBuffer], _: &str) -> Result<Vec<u8>, BundleError> {
            Err(BundleError("disk full".to_string()))
        }
    }

    fn tiles(highlight: Slot) -> Vec<Tile> {
        Slot::ALL
            .iter()
            .map(|&slot| Tile {
                slot,
                highlighted: slot == highlight,
                raster: Raster::filled(4, if slot == highlight { 6 } else { 5 }, [1, 2, 3, 255]),
            })
            .collect()
    }

    #[test]
    fn test_export_names_and_bundle() {
        let mut bundler = RecordingBundler::default();
        let bundle = export_tiles(&tiles(Slot::Center), "2024-01-15", &mut bundler).unwrap();

        assert_eq!(bundle.name, "2024-01-15_instagram-posts.zip");
        assert_eq!(bundler.calls.len(), 1);
        let (names, bundle_name) = &bundler.calls[0];
        assert_eq!(
            names,
            &vec![
                "2024-01-15_3.png".to_string(),
                "2024-01-15_2_reel.png".to_string(),
                "2024-01-15_1.png".to_string(),
            ]
        );
        assert_eq!(bundle_name, "2024-01-15_instagram-posts.zip");
        assert_eq!(
            bundle.bytes,
            b"2024-01-15_3.png,2024-01-15_2_reel.png,2024-01-15_1.png".to_vec()
        );
    }

    #[test]
    fn test_encoded_tiles_are_png() {
        let files = encode_tiles(&tiles(Slot::Left), "d").unwrap();
        assert_eq!(files.len(), 3);
        for file in &files {
            assert_eq!(&file.bytes[1..4], b"PNG");
        }
        assert_eq!(files[0].name, "d_3_reel.png");
    }

    #[test]
    fn test_empty_tiles_not_ready() {
        let mut bundler = RecordingBundler::default();
        let result = export_tiles(&[], "2024-01-15", &mut bundler);
        assert!(matches!(result, Err(ExportError::NotReady)));
        assert!(bundler.calls.is_empty());
    }

    #[test]
    fn test_encode_failure_skips_bundler() {
        let mut broken = tiles(Slot::Right);
        broken[1].raster = Raster {
            width: 4,
            height: 5,
            pixels: vec![0; 3],
        };

        let mut bundler = RecordingBundler::default();
        let result = export_tiles(&broken, "2024-01-15", &mut bundler);
        match result {
            Err(ExportError::Encode { name, .. }) => assert_eq!(name, "2024-01-15_2.png"),
            other => panic!("expected encode error, got {:?}", other),
        }
        assert!(bundler.calls.is_empty());
    }

    #[test]
    fn test_bundler_failure_is_terminal() {
        let result = export_tiles(&tiles(Slot::Left), "2024-01-15", &mut FailingBundler);
        let err = result.unwrap_err();
        assert!(matches!(err, ExportError::Bundle(_)));
        assert_eq!(err.to_string(), "Bundling failed: disk full");
    }
}
