//! # ZX Next Layer 3 Assets
//!
//! Turns a Tiled map, its tileset and the decoded tileset image into the three buffers the
//! Layer 3 tilemap hardware consumes: 4bpp tile graphics, an `RRRGGGBB` palette and a tilemap.

pub mod palette;
pub mod tilemap;
pub mod tiles;
pub mod validate;

use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub use palette::{convert_colour, convert_palette, expand_colour};
pub use tilemap::{build_row_major, to_column_major, to_row_major, TileMapEntry};
pub use tiles::{pack_block, pack_tiles, unpack_tile, PixelBlock, BYTES_PER_TILE};

use crate::{
    error::Result,
    indexed::IndexedImage,
    tiled::{MapDescriptor, TilesetDescriptor},
};

/// How native tile indices are stored in the two bytes of a tilemap entry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IndexEncoding {
    /// Low byte only, larger indices wrap. High byte is always 0.
    #[default]
    Truncate,
    /// Low byte only, larger indices are an error
    Checked,
    /// Full 16-bit index across both bytes
    Wide,
}

/// Scan order of the tilemap file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TilemapOrder {
    #[default]
    ColumnMajor,
    RowMajor,
}

/// Everything one conversion produces
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer3Data {
    pub tiles: Vec<u8>,
    pub palette: Vec<u8>,
    pub tilemap_row_major: Vec<TileMapEntry>,
    pub tilemap_column_major: Vec<TileMapEntry>,
    /// Map width in native 8×8 cells
    pub map_width: u32,
    /// Map height in native 8×8 cells
    pub map_height: u32,
}

impl Layer3Data {
    /// Tiles in the packed buffer, the reserved sentinel included
    pub fn packed_tile_count(&self) -> usize {
        self.tiles.len() / BYTES_PER_TILE
    }

    /// Native tiles cut from the tileset
    pub fn native_tile_count(&self) -> usize {
        self.packed_tile_count().saturating_sub(1)
    }

    pub fn tilemap(&self, order: TilemapOrder) -> &[TileMapEntry] {
        match order {
            TilemapOrder::ColumnMajor => &self.tilemap_column_major,
            TilemapOrder::RowMajor => &self.tilemap_row_major,
        }
    }

    /// Tilemap as written to disk, two bytes per entry, low byte first
    pub fn tilemap_bytes(&self, order: TilemapOrder) -> Vec<u8> {
        let entries = self.tilemap(order);
        let mut bytes = Vec::with_capacity(entries.len() * 2);
        for entry in entries {
            bytes.extend_from_slice(&entry.to_le_bytes());
        }
        bytes
    }
}

/// Run the full conversion. All inputs are validated before any buffer is built.
pub fn convert(
    map: &MapDescriptor,
    tileset: &TilesetDescriptor,
    image: &IndexedImage,
    encoding: IndexEncoding,
) -> Result<Layer3Data> {
    validate::check_tileset(tileset)?;
    validate::check_map(map, tileset)?;
    validate::check_image(image, tileset)?;

    let tiles = pack_tiles(image, tileset)?;
    debug!(
        "Packed {} native tiles ({} bytes)",
        (tiles.len() / BYTES_PER_TILE).saturating_sub(1),
        tiles.len()
    );

    let palette = palette::palette_from_image(image)?;
    debug!("Converted {} palette entries", palette.len());

    let (map_width, map_height) = tilemap::native_dimensions(map, tileset)?;
    let tilemap_row_major = build_row_major(map, tileset, encoding)?;
    let tilemap_column_major = to_column_major(&tilemap_row_major, map_width, map_height)?;

    info!(
        "Converted {}x{} map into {}x{} native cells",
        map.map_width, map.map_height, map_width, map_height
    );

    Ok(Layer3Data {
        tiles,
        palette,
        tilemap_row_major,
        tilemap_column_major,
        map_width,
        map_height,
    })
}
