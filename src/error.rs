use std::fmt;
use std::io;

/// Error type for every stage of a map conversion
#[derive(Debug)]
pub enum ConversionError {
    /// The tileset image has no palette
    NotIndexedColour,
    /// Indexed image with a bit depth we cannot unpack
    UnsupportedPixelDepth(u8),
    /// Descriptor fields that disagree with each other or with the image
    InvalidDescriptor(String),
    /// A map cell references a tile the tileset does not have
    TileIndexOutOfRange {
        cell: usize,
        tile_ref: u32,
        tile_count: u32,
    },
    /// A native tile index does not fit in the selected tilemap encoding
    TileIndexOverflow { index: u64, max: u64 },
    /// A pixel uses a palette index that does not fit in a nibble
    PixelValueOutOfRange { tile: u32, value: u8 },
    /// Tilemap length does not match the native map dimensions
    TilemapLength { expected: usize, actual: usize },
    /// Structural problem in a Tiled document
    Tiled(String),
    /// XML parse failure
    Xml(String),
    /// JSON parse or write failure
    Json(serde_json::Error),
    /// PNG decode failure
    Png(png::DecodingError),
    /// Image processing error
    Image(image::ImageError),
    /// I/O error
    Io(io::Error),
}

impl From<io::Error> for ConversionError {
    fn from(err: io::Error) -> Self {
        ConversionError::Io(err)
    }
}

impl From<serde_json::Error> for ConversionError {
    fn from(err: serde_json::Error) -> Self {
        ConversionError::Json(err)
    }
}

impl From<png::DecodingError> for ConversionError {
    fn from(err: png::DecodingError) -> Self {
        ConversionError::Png(err)
    }
}

impl From<image::ImageError> for ConversionError {
    fn from(err: image::ImageError) -> Self {
        ConversionError::Image(err)
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::NotIndexedColour => {
                write!(f, "Tileset image is not indexed colour")
            }
            ConversionError::UnsupportedPixelDepth(depth) => {
                write!(f, "Unsupported indexed pixel depth: {} bits", depth)
            }
            ConversionError::InvalidDescriptor(msg) => write!(f, "Invalid descriptor: {}", msg),
            ConversionError::TileIndexOutOfRange {
                cell,
                tile_ref,
                tile_count,
            } => write!(
                f,
                "Map cell {} references tile {} but the tileset has {} tiles",
                cell, tile_ref, tile_count
            ),
            ConversionError::TileIndexOverflow { index, max } => write!(
                f,
                "Native tile index {} exceeds the tilemap encoding maximum of {}",
                index, max
            ),
            ConversionError::PixelValueOutOfRange { tile, value } => write!(
                f,
                "Tile {} uses palette index {}, only 0-15 can be packed",
                tile, value
            ),
            ConversionError::TilemapLength { expected, actual } => write!(
                f,
                "Tilemap has {} entries, expected {}",
                actual, expected
            ),
            ConversionError::Tiled(msg) => write!(f, "Tiled error: {}", msg),
            ConversionError::Xml(msg) => write!(f, "XML error: {}", msg),
            ConversionError::Json(err) => write!(f, "JSON error: {}", err),
            ConversionError::Png(err) => write!(f, "PNG error: {}", err),
            ConversionError::Image(err) => write!(f, "Image error: {}", err),
            ConversionError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConversionError::Json(err) => Some(err),
            ConversionError::Png(err) => Some(err),
            ConversionError::Image(err) => Some(err),
            ConversionError::Io(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
