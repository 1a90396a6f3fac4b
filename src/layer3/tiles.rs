//! # Layer 3 Tile Data
//!
//! Native tiles are 8×8 pixels stored in 4bpp format, 32 bytes each. The first pixel of every
//! pair sits in the high nibble.
//!
//! Tile 0 of the output is a reserved all-`0xFF` tile used for empty map cells. Source tiles
//! follow in tileset order, each larger tile split into its native 8×8 cells one meta row at a
//! time.

use super::validate;
use crate::{
    error::{ConversionError, Result},
    indexed::{IndexedImage, BLOCK_DIM, BLOCK_PIXELS},
    tiled::TilesetDescriptor,
};

pub const BYTES_PER_TILE: usize = BLOCK_PIXELS / 2;
pub const SENTINEL_TILE: [u8; BYTES_PER_TILE] = [0xFF; BYTES_PER_TILE];

/// Largest palette index a nibble can hold
const MAX_PIXEL_VALUE: u8 = 0x0F;

/// 64 palette indices of one native tile, row-major
pub type PixelBlock = [u8; BLOCK_PIXELS];

pub fn pack_block(block: &PixelBlock) -> [u8; BYTES_PER_TILE] {
    let mut tile = [0u8; BYTES_PER_TILE];
    for (i, pair) in block.chunks_exact(2).enumerate() {
        tile[i] = (pair[0] << 4) | (pair[1] & MAX_PIXEL_VALUE);
    }
    tile
}

/// Decode a packed tile back into 8×8 palette indices (0-15)
pub fn unpack_tile(tile: &[u8; BYTES_PER_TILE]) -> PixelBlock {
    let mut pixels = [0u8; BLOCK_PIXELS];
    for i in 0..BYTES_PER_TILE {
        pixels[i * 2] = (tile[i] >> 4) & 0x0F;
        pixels[i * 2 + 1] = tile[i] & 0x0F;
    }
    pixels
}

/// Bytes the packed buffer will occupy, sentinel included
pub fn packed_size(tileset: &TilesetDescriptor) -> Result<usize> {
    Ok((tileset.native_tile_count()? as usize + 1) * BYTES_PER_TILE)
}

/// Top-left pixel of every native cell in output order, paired with its source tile id
fn native_cell_origins(tileset: &TilesetDescriptor) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
    let meta_w = tileset.meta_width();
    let meta_h = tileset.meta_height();
    let dim = BLOCK_DIM as u32;
    (0..tileset.tile_count).flat_map(move |tile_id| {
        let base_x = (tile_id % tileset.columns) * tileset.tile_width;
        let base_y = (tile_id / tileset.columns) * tileset.tile_height;
        (0..meta_h).flat_map(move |row| {
            (0..meta_w).map(move |col| (tile_id, base_x + col * dim, base_y + row * dim))
        })
    })
}

pub fn pack_tiles(image: &IndexedImage, tileset: &TilesetDescriptor) -> Result<Vec<u8>> {
    if !image.is_indexed() {
        return Err(ConversionError::NotIndexedColour);
    }
    if !matches!(image.bit_depth, 1 | 2 | 4 | 8) {
        return Err(ConversionError::UnsupportedPixelDepth(image.bit_depth));
    }
    validate::check_tileset(tileset)?;

    let mut packed = Vec::with_capacity(packed_size(tileset)?);
    packed.extend_from_slice(&SENTINEL_TILE);

    for (tile_id, x, y) in native_cell_origins(tileset) {
        let block = image.read_block(x, y).ok_or_else(|| {
            ConversionError::InvalidDescriptor(format!(
                "tile {} needs pixels at ({}, {}) outside the {}x{} image",
                tile_id, x, y, image.width, image.height
            ))
        })?;
        if let Some(&value) = block.iter().find(|&&p| p > MAX_PIXEL_VALUE) {
            return Err(ConversionError::PixelValueOutOfRange {
                tile: tile_id,
                value,
            });
        }
        packed.extend_from_slice(&pack_block(&block));
    }

    Ok(packed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexed::Rgb;
    use std::path::PathBuf;

    fn tileset(tile_width: u32, tile_height: u32, tile_count: u32, columns: u32) -> TilesetDescriptor {
        TilesetDescriptor {
            image_path: PathBuf::from("tiles.png"),
            image_width: columns * tile_width,
            image_height: tile_count.div_ceil(columns) * tile_height,
            tile_width,
            tile_height,
            tile_count,
            columns,
        }
    }

    /// Every pixel carries the index of the native 8×8 cell it lies in, modulo 16
    fn cell_numbered_image(width: u32, height: u32) -> IndexedImage {
        let cells_across = width / 8;
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (((y / 8) * cells_across + x / 8) % 16) as u8))
            .collect();
        IndexedImage::new(width, height, 8, vec![Rgb::default(); 16], pixels).unwrap()
    }

    #[test]
    fn pack_and_unpack_round_trip() {
        let mut blocks = vec![[0u8; BLOCK_PIXELS], [0x0F; BLOCK_PIXELS]];
        for seed in [1usize, 3, 7, 11, 13] {
            let mut block = [0u8; BLOCK_PIXELS];
            for (i, p) in block.iter_mut().enumerate() {
                *p = ((i * seed + seed / 2) % 16) as u8;
            }
            blocks.push(block);
        }
        let mut checker = [0u8; BLOCK_PIXELS];
        for (i, p) in checker.iter_mut().enumerate() {
            *p = if (i / BLOCK_DIM + i % BLOCK_DIM) % 2 == 0 { 0x0F } else { 0 };
        }
        blocks.push(checker);

        for block in &blocks {
            assert_eq!(unpack_tile(&pack_block(block)), *block);
        }
    }

    #[test]
    fn overflowing_tileset_is_rejected_before_packing() {
        let mut ts = tileset(8, 8, 1, 1);
        ts.tile_count = u32::MAX;
        let image = cell_numbered_image(8, 8);
        assert!(matches!(
            pack_tiles(&image, &ts),
            Err(ConversionError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn first_pixel_goes_in_high_nibble() {
        let mut block = [0u8; BLOCK_PIXELS];
        block[0] = 0xA;
        block[1] = 0x5;
        assert_eq!(pack_block(&block)[0], 0xA5);
    }

    #[test]
    fn sentinel_precedes_real_tiles() {
        let ts = tileset(8, 8, 4, 2);
        let image = cell_numbered_image(16, 16);
        let packed = pack_tiles(&image, &ts).unwrap();

        assert_eq!(packed.len(), 32 * 5);
        assert!(packed[..32].iter().all(|&b| b == 0xFF));
        // Tile 3 sits at (8, 8), so every pixel is 3
        assert!(packed[4 * 32..].iter().all(|&b| b == 0x33));
    }

    #[test]
    fn sentinel_is_emitted_for_empty_tileset() {
        let ts = tileset(8, 8, 0, 1);
        let image = cell_numbered_image(8, 8);
        assert_eq!(pack_tiles(&image, &ts).unwrap(), SENTINEL_TILE.to_vec());
    }

    #[test]
    fn meta_tiles_split_row_by_row() {
        // Two 16x16 tiles side by side: native cells 0,1 / 4,5 and 2,3 / 6,7 in a 32x16 image
        let ts = tileset(16, 16, 2, 2);
        let image = cell_numbered_image(32, 16);
        let packed = pack_tiles(&image, &ts).unwrap();

        assert_eq!(packed.len(), packed_size(&ts).unwrap());
        assert_eq!(packed.len(), 32 * (8 + 1));
        let cells: Vec<u8> = packed[32..].chunks(32).map(|t| t[0] >> 4).collect();
        assert_eq!(cells, vec![0, 1, 4, 5, 2, 3, 6, 7]);
    }

    #[test]
    fn direct_colour_is_rejected() {
        let ts = tileset(8, 8, 1, 1);
        let image = IndexedImage::direct(8, 8, 8);
        assert!(matches!(
            pack_tiles(&image, &ts),
            Err(ConversionError::NotIndexedColour)
        ));
    }

    #[test]
    fn wide_pixel_values_are_rejected() {
        let ts = tileset(8, 8, 1, 1);
        let mut pixels = vec![0u8; 64];
        pixels[10] = 16;
        let image = IndexedImage::new(8, 8, 8, vec![Rgb::default(); 17], pixels).unwrap();
        assert!(matches!(
            pack_tiles(&image, &ts),
            Err(ConversionError::PixelValueOutOfRange { tile: 0, value: 16 })
        ));
    }

    #[test]
    fn tiles_outside_image_are_rejected() {
        let ts = tileset(8, 8, 3, 2);
        let image = cell_numbered_image(16, 8);
        assert!(matches!(
            pack_tiles(&image, &ts),
            Err(ConversionError::InvalidDescriptor(_))
        ));
    }
}
