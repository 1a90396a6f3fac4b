//! # Tilemap Preview
//!
//! Renders converted Layer 3 data back into an RGBA image, using the reduced palette, so the
//! output can be checked by eye without loading it on hardware.

use std::{fs, path::Path};

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, Rgba, RgbaImage};
use log::warn;

use crate::{
    error::Result,
    indexed::BLOCK_DIM,
    layer3::{expand_colour, unpack_tile, Layer3Data, BYTES_PER_TILE},
};

/// Draw the row-major tilemap. Cells referencing the reserved tile 0 stay transparent, as do
/// indices past the end of the tile data.
pub fn render_preview(data: &Layer3Data) -> RgbaImage {
    let mut img = RgbaImage::new(
        data.map_width * BLOCK_DIM as u32,
        data.map_height * BLOCK_DIM as u32,
    );

    let palette: Vec<Rgba<u8>> = data
        .palette
        .iter()
        .map(|&byte| {
            let c = expand_colour(byte);
            Rgba([c.r, c.g, c.b, 255])
        })
        .collect();

    let width = data.map_width as usize;
    for (i, entry) in data.tilemap_row_major.iter().enumerate() {
        let tile_index = entry.index() as usize;
        if tile_index == 0 {
            continue;
        }
        let start = tile_index * BYTES_PER_TILE;
        let Some(bytes) = data.tiles.get(start..start + BYTES_PER_TILE) else {
            continue;
        };
        let mut tile = [0u8; BYTES_PER_TILE];
        tile.copy_from_slice(bytes);
        let pixels = unpack_tile(&tile);

        let tx = (i % width) * BLOCK_DIM;
        let ty = (i / width) * BLOCK_DIM;
        for py in 0..BLOCK_DIM {
            for px in 0..BLOCK_DIM {
                let ci = pixels[py * BLOCK_DIM + px] as usize;
                let rgba = palette.get(ci).copied().unwrap_or(Rgba([0, 0, 0, 0]));
                img.put_pixel((tx + px) as u32, (ty + py) as u32, rgba);
            }
        }
    }

    img
}

/// Encode the preview as PNG in memory
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Write the preview, shrunk by oxipng when it can be. An oxipng failure only costs file size.
pub fn save_preview_png(image: &RgbaImage, path: &Path) -> Result<()> {
    let encoded = encode_png(image)?;

    let mut options = oxipng::Options::from_preset(2);
    options.bit_depth_reduction = true;
    options.interlace = None;

    let bytes = match oxipng::optimize_from_memory(&encoded, &options) {
        Ok(optimised) => optimised,
        Err(e) => {
            warn!("oxipng could not shrink {}: {}", path.display(), e);
            encoded
        }
    };
    fs::write(path, bytes)?;
    Ok(())
}
