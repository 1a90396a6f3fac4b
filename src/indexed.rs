//! # Indexed Tileset Image
//!
//! Decodes the tileset PNG into one palette index per pixel, keeping the colour table alongside.
//! Packed sub-byte depths (1, 2 and 4 bits) are widened so every pixel occupies one byte.

use std::{fs::File, io::Read, path::Path};

use crate::error::{ConversionError, Result};

/// Side length of a native hardware tile in pixels
pub const BLOCK_DIM: usize = 8;
pub const BLOCK_PIXELS: usize = BLOCK_DIM * BLOCK_DIM;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// How the source image stores colour
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColourModel {
    /// Pixels are indices into this colour table
    Indexed(Vec<Rgb>),
    /// Pixels carry their own channel values
    Direct,
}

pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub colour_model: ColourModel,
    /// One palette index per pixel, row-major. Empty for direct colour images.
    pixels: Vec<u8>,
}

impl IndexedImage {
    pub fn new(
        width: u32,
        height: u32,
        bit_depth: u8,
        palette: Vec<Rgb>,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ConversionError::InvalidDescriptor(format!(
                "image data has {} pixels, expected {}x{} = {}",
                pixels.len(),
                width,
                height,
                expected
            )));
        }
        Ok(IndexedImage {
            width,
            height,
            bit_depth,
            colour_model: ColourModel::Indexed(palette),
            pixels,
        })
    }

    /// A placeholder for truecolour or greyscale images. Carries no pixel data.
    pub fn direct(width: u32, height: u32, bit_depth: u8) -> Self {
        IndexedImage {
            width,
            height,
            bit_depth,
            colour_model: ColourModel::Direct,
            pixels: Vec::new(),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::decode_png(file)
    }

    pub fn decode_png<R: Read>(reader: R) -> Result<Self> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::IDENTITY);
        let mut reader = decoder.read_info()?;
        let mut buffer = vec![0u8; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buffer)?;

        let depth = frame.bit_depth as u8;
        if frame.color_type != png::ColorType::Indexed {
            return Ok(Self::direct(frame.width, frame.height, depth));
        }
        if !matches!(depth, 1 | 2 | 4 | 8) {
            return Err(ConversionError::UnsupportedPixelDepth(depth));
        }

        let palette = reader
            .info()
            .palette
            .as_ref()
            .map(|pal| {
                pal.chunks_exact(3)
                    .map(|c| Rgb {
                        r: c[0],
                        g: c[1],
                        b: c[2],
                    })
                    .collect::<Vec<_>>()
            })
            .ok_or(ConversionError::NotIndexedColour)?;

        let pixels = unpack_rows(
            &buffer,
            frame.width as usize,
            frame.height as usize,
            frame.line_size,
            depth,
        );
        Self::new(frame.width, frame.height, depth, palette, pixels)
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.colour_model, ColourModel::Indexed(_))
    }

    pub fn palette(&self) -> Option<&[Rgb]> {
        match &self.colour_model {
            ColourModel::Indexed(palette) => Some(palette),
            ColourModel::Direct => None,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Read the 8×8 block whose top-left corner is at (x, y), row-major.
    /// Returns `None` if any part of the block falls outside the image.
    pub fn read_block(&self, x: u32, y: u32) -> Option<[u8; BLOCK_PIXELS]> {
        let dim = BLOCK_DIM as u32;
        if !self.is_indexed() || x + dim > self.width || y + dim > self.height {
            return None;
        }
        let mut block = [0u8; BLOCK_PIXELS];
        let stride = self.width as usize;
        for row in 0..BLOCK_DIM {
            let start = (y as usize + row) * stride + x as usize;
            block[row * BLOCK_DIM..(row + 1) * BLOCK_DIM]
                .copy_from_slice(&self.pixels[start..start + BLOCK_DIM]);
        }
        Some(block)
    }
}

/// Widen packed scanlines to one index per byte. PNG packs sub-byte pixels MSB first.
fn unpack_rows(data: &[u8], width: usize, height: usize, line_size: usize, depth: u8) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height);
    if depth == 8 {
        for line in data.chunks(line_size).take(height) {
            pixels.extend_from_slice(&line[..width]);
        }
        return pixels;
    }

    let per_byte = (8 / depth) as usize;
    let mask = (1u8 << depth) - 1;
    for line in data.chunks(line_size).take(height) {
        for x in 0..width {
            let byte = line[x / per_byte];
            let shift = 8 - depth as usize * (x % per_byte + 1);
            pixels.push((byte >> shift) & mask);
        }
    }
    pixels
}
