//! Up-front checks on the descriptors and tileset image. Everything here runs before any output
//! buffer is filled, so a bad input never yields partial data.

use log::warn;

use super::tilemap;
use crate::{
    error::{ConversionError, Result},
    indexed::IndexedImage,
    tiled::{MapDescriptor, TilesetDescriptor},
};

fn invalid(msg: String) -> ConversionError {
    ConversionError::InvalidDescriptor(msg)
}

pub fn check_tileset(tileset: &TilesetDescriptor) -> Result<()> {
    for (name, size) in [("width", tileset.tile_width), ("height", tileset.tile_height)] {
        if size == 0 || size % 8 != 0 {
            return Err(invalid(format!(
                "tile {} {} is not a positive multiple of 8",
                name, size
            )));
        }
    }
    if tileset.columns == 0 {
        return Err(invalid("tileset has zero columns".to_string()));
    }

    let fitting_columns = tileset.image_width / tileset.tile_width;
    if tileset.columns != fitting_columns {
        return Err(invalid(format!(
            "tileset declares {} columns but a {} pixel wide image holds {} tiles of width {}",
            tileset.columns, tileset.image_width, fitting_columns, tileset.tile_width
        )));
    }

    let needed_height = grid_height(tileset)?;
    if needed_height > tileset.image_height {
        return Err(invalid(format!(
            "{} tiles in {} columns need {} pixel rows but the image is {} high",
            tileset.tile_count, tileset.columns, needed_height, tileset.image_height
        )));
    }
    tileset.native_tile_count()?;
    Ok(())
}

/// Pixel rows covered by the tile grid
fn grid_height(tileset: &TilesetDescriptor) -> Result<u32> {
    let rows = tileset.tile_count.div_ceil(tileset.columns.max(1));
    rows.checked_mul(tileset.tile_height).ok_or_else(|| {
        invalid(format!(
            "{} rows of {} pixel tiles overflow the tileset height",
            rows, tileset.tile_height
        ))
    })
}

pub fn check_map(map: &MapDescriptor, tileset: &TilesetDescriptor) -> Result<()> {
    let cells = map.map_width as usize * map.map_height as usize;
    if map.tile_refs.len() != cells {
        return Err(invalid(format!(
            "map has {} tile references, expected {}x{} = {}",
            map.tile_refs.len(),
            map.map_width,
            map.map_height,
            cells
        )));
    }

    if let Some((cell, &tile_ref)) = map
        .tile_refs
        .iter()
        .enumerate()
        .find(|&(_, &r)| r >= tileset.tile_count)
    {
        return Err(ConversionError::TileIndexOutOfRange {
            cell,
            tile_ref,
            tile_count: tileset.tile_count,
        });
    }
    tilemap::native_dimensions(map, tileset)?;
    Ok(())
}

pub fn check_image(image: &IndexedImage, tileset: &TilesetDescriptor) -> Result<()> {
    if !image.is_indexed() {
        return Err(ConversionError::NotIndexedColour);
    }
    if !matches!(image.bit_depth, 1 | 2 | 4 | 8) {
        return Err(ConversionError::UnsupportedPixelDepth(image.bit_depth));
    }

    if (image.width, image.height) != (tileset.image_width, tileset.image_height) {
        warn!(
            "Tileset image is {}x{} but the tileset declares {}x{}",
            image.width, image.height, tileset.image_width, tileset.image_height
        );
    }

    let needed_width = tileset
        .columns
        .checked_mul(tileset.tile_width)
        .ok_or_else(|| invalid(format!("{} columns overflow the tileset width", tileset.columns)))?;
    let needed_height = grid_height(tileset)?;
    if image.width < needed_width || image.height < needed_height {
        return Err(invalid(format!(
            "tileset image is {}x{}, the tile grid needs at least {}x{}",
            image.width, image.height, needed_width, needed_height
        )));
    }
    Ok(())
}
