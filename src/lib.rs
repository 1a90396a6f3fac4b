//! Convert Tiled maps into ZX Spectrum Next Layer 3 tilemap assets.
//!
//! The tileset image must be an indexed-colour PNG using palette indices 0-15. Output is a 4bpp
//! tile file with a reserved blank tile at index 0, a one-byte-per-colour palette and a
//! tilemap of 16-bit entries in the column-major order the hardware scans.

pub mod config;
pub mod error;
pub mod indexed;
pub mod layer3;
pub mod preview;
pub mod tiled;
pub mod writer;

use std::path::Path;

use log::info;

pub use config::Config;
pub use error::{ConversionError, Result};
pub use indexed::IndexedImage;
pub use layer3::{convert, IndexEncoding, Layer3Data, TileMapEntry, TilemapOrder};
pub use tiled::{MapDescriptor, TilesetDescriptor};
pub use writer::OutputPaths;

/// Load a map, its tileset and tileset image, then convert it in memory
pub fn convert_map<P: AsRef<Path>>(map_path: P, encoding: IndexEncoding) -> Result<Layer3Data> {
    let (map, tileset) = tiled::load(map_path.as_ref())?;
    let image = IndexedImage::open(&tileset.image_path)?;
    convert(&map, &tileset, &image, encoding)
}

/// Convert a map and write every configured output. Nothing is written if conversion fails.
pub fn run<P: AsRef<Path>>(map_path: P, config: &Config) -> Result<OutputPaths> {
    let map_path = map_path.as_ref();
    info!("Reading map {}", map_path.display());
    let (map, tileset) = tiled::load(map_path)?;
    info!(
        "Tileset {}: {} tiles of {}x{}",
        map.tileset_path.display(),
        tileset.tile_count,
        tileset.tile_width,
        tileset.tile_height
    );

    let image = IndexedImage::open(&tileset.image_path)?;
    let data = convert(&map, &tileset, &image, config.index_encoding)?;
    writer::write_assets(&data, config, map_path, &map, &tileset)
}
