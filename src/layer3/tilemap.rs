//! # Layer 3 Tilemap
//!
//! Expands map cells into native tile indices and reorders them for the hardware, which scans
//! tilemap memory column by column.

use log::warn;

use super::IndexEncoding;
use crate::{
    error::{ConversionError, Result},
    tiled::{MapDescriptor, TilesetDescriptor},
};

/// One tilemap slot: a 16-bit native tile index split into bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileMapEntry {
    pub high: u8,
    pub low: u8,
}

impl TileMapEntry {
    pub fn new(high: u8, low: u8) -> Self {
        TileMapEntry { high, low }
    }

    pub fn from_index(index: u64, encoding: IndexEncoding) -> Result<Self> {
        match encoding {
            IndexEncoding::Truncate => Ok(TileMapEntry::new(0, index as u8)),
            IndexEncoding::Checked => {
                let low = u8::try_from(index).map_err(|_| ConversionError::TileIndexOverflow {
                    index,
                    max: u8::MAX as u64,
                })?;
                Ok(TileMapEntry::new(0, low))
            }
            IndexEncoding::Wide => {
                let word = u16::try_from(index).map_err(|_| ConversionError::TileIndexOverflow {
                    index,
                    max: u16::MAX as u64,
                })?;
                let [high, low] = word.to_be_bytes();
                Ok(TileMapEntry::new(high, low))
            }
        }
    }

    pub fn index(self) -> u16 {
        u16::from_be_bytes([self.high, self.low])
    }

    /// On-disk form: low byte first
    pub fn to_le_bytes(self) -> [u8; 2] {
        [self.low, self.high]
    }
}

/// Map size counted in native 8×8 cells
pub fn native_dimensions(map: &MapDescriptor, tileset: &TilesetDescriptor) -> Result<(u32, u32)> {
    let scale = |cells: u32, meta: u32, axis: &str| {
        cells.checked_mul(meta).ok_or_else(|| {
            ConversionError::InvalidDescriptor(format!(
                "map {} of {} cells overflows at {} native cells per tile",
                axis, cells, meta
            ))
        })
    };
    Ok((
        scale(map.map_width, tileset.meta_width(), "width")?,
        scale(map.map_height, tileset.meta_height(), "height")?,
    ))
}

/// Build the tilemap in raster order: map row, meta row, map column, meta column.
///
/// A cell holding tile `t` yields `t * meta_width + meta_col` on every meta row, in the source
/// tile numbering. Tile references are not range checked here.
pub fn build_row_major(
    map: &MapDescriptor,
    tileset: &TilesetDescriptor,
    encoding: IndexEncoding,
) -> Result<Vec<TileMapEntry>> {
    let cells = map.map_width as usize * map.map_height as usize;
    if map.tile_refs.len() != cells {
        return Err(ConversionError::InvalidDescriptor(format!(
            "map has {} tile references, expected {}x{} = {}",
            map.tile_refs.len(),
            map.map_width,
            map.map_height,
            cells
        )));
    }

    let meta_w = tileset.meta_width() as u64;
    let meta_h = tileset.meta_height() as u64;
    let mut entries = Vec::with_capacity(cells * (meta_w * meta_h) as usize);
    let mut truncated = 0usize;

    for map_row in 0..map.map_height as usize {
        let row_refs = &map.tile_refs[map_row * map.map_width as usize..][..map.map_width as usize];
        for _meta_row in 0..meta_h {
            for &tile_ref in row_refs {
                for meta_col in 0..meta_w {
                    let index = tile_ref as u64 * meta_w + meta_col;
                    if index > u8::MAX as u64 {
                        truncated += 1;
                    }
                    entries.push(TileMapEntry::from_index(index, encoding)?);
                }
            }
        }
    }

    if truncated > 0 && encoding == IndexEncoding::Truncate {
        warn!(
            "{} tilemap entries exceed 255 and were truncated to their low byte",
            truncated
        );
    }

    Ok(entries)
}

fn check_length(len: usize, width: u32, height: u32) -> Result<()> {
    let expected = width as usize * height as usize;
    if len != expected {
        return Err(ConversionError::TilemapLength {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Output slot `k * width + j` takes input slot `j * height + k`
pub fn to_column_major<T: Copy>(entries: &[T], width: u32, height: u32) -> Result<Vec<T>> {
    check_length(entries.len(), width, height)?;
    let (width, height) = (width as usize, height as usize);
    let mut reordered = Vec::with_capacity(entries.len());
    for k in 0..height {
        for j in 0..width {
            reordered.push(entries[j * height + k]);
        }
    }
    Ok(reordered)
}

/// Inverse of [`to_column_major`]
pub fn to_row_major<T: Copy>(entries: &[T], width: u32, height: u32) -> Result<Vec<T>> {
    check_length(entries.len(), width, height)?;
    let (width, height) = (width as usize, height as usize);
    let mut reordered = Vec::with_capacity(entries.len());
    for j in 0..width {
        for k in 0..height {
            reordered.push(entries[k * width + j]);
        }
    }
    Ok(reordered)
}
