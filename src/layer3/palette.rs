//! # Layer 3 Palette
//!
//! Reduces a 24-bit colour table to one byte per colour, laid out as `RRRGGGBB`. Entry order is
//! kept so pixel indices in the packed tiles still address the same colours.

use crate::{
    error::{ConversionError, Result},
    indexed::{IndexedImage, Rgb},
};

const RED_MASK: u8 = 0b1110_0000;
const GREEN_MASK: u8 = 0b1110_0000;
const BLUE_MASK: u8 = 0b1100_0000;

pub fn convert_colour(colour: Rgb) -> u8 {
    (colour.r & RED_MASK) | ((colour.g & GREEN_MASK) >> 3) | ((colour.b & BLUE_MASK) >> 6)
}

pub fn convert_palette(colours: &[Rgb]) -> Vec<u8> {
    colours.iter().copied().map(convert_colour).collect()
}

/// Palette bytes for the image's colour table
pub fn palette_from_image(image: &IndexedImage) -> Result<Vec<u8>> {
    image
        .palette()
        .map(convert_palette)
        .ok_or(ConversionError::NotIndexedColour)
}

/// Widen an `RRRGGGBB` byte back to 24-bit colour by bit replication
pub fn expand_colour(byte: u8) -> Rgb {
    let r = byte >> 5;
    let g = (byte >> 2) & 0b111;
    let b = byte & 0b11;
    Rgb {
        r: (r << 5) | (r << 2) | (r >> 1),
        g: (g << 5) | (g << 2) | (g >> 1),
        b: (b << 6) | (b << 4) | (b << 2) | b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }

    #[test]
    fn pure_red() {
        assert_eq!(convert_colour(rgb(0xFF, 0x00, 0x00)), 0b1110_0000);
    }

    #[test]
    fn pure_blue() {
        assert_eq!(convert_colour(rgb(0x00, 0x00, 0xFF)), 0b0000_0011);
    }

    #[test]
    fn pure_green() {
        assert_eq!(convert_colour(rgb(0x00, 0xFF, 0x00)), 0b0001_1100);
    }

    #[test]
    fn low_bits_are_dropped() {
        assert_eq!(convert_colour(rgb(0x20, 0x20, 0x40)), 0b0010_0100 | 0b01);
        assert_eq!(convert_colour(rgb(0x1F, 0x1F, 0x3F)), 0);
    }

    #[test]
    fn order_and_duplicates_are_preserved() {
        let colours = [rgb(0xFF, 0xFF, 0xFF), rgb(0, 0, 0), rgb(0xFF, 0xFF, 0xFF)];
        assert_eq!(convert_palette(&colours), vec![0xFF, 0x00, 0xFF]);
    }

    #[test]
    fn expanded_colours_reduce_to_themselves() {
        for byte in 0..=255u8 {
            assert_eq!(convert_colour(expand_colour(byte)), byte);
        }
    }

    #[test]
    fn direct_colour_image_has_no_palette() {
        let image = IndexedImage::direct(8, 8, 8);
        assert!(matches!(
            palette_from_image(&image),
            Err(ConversionError::NotIndexedColour)
        ));
    }
}
