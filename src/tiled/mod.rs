//! # Tiled Documents
//!
//! Reads the map and tileset documents exported by the Tiled editor. Both the XML flavour
//! (TMX/TSX) and the JSON flavour (TMJ/TSJ) are understood; the format is picked from the file
//! extension. Only what the Layer 3 conversion needs is extracted.

pub mod tmj;
pub mod tmx;

use std::path::{Path, PathBuf};

use crate::error::{ConversionError, Result};

/// Metadata about a tileset and the image that holds its tiles
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TilesetDescriptor {
    pub image_path: PathBuf,
    pub image_width: u32,
    pub image_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
    pub columns: u32,
}

impl TilesetDescriptor {
    /// Native 8×8 cells across one tileset tile
    pub fn meta_width(&self) -> u32 {
        self.tile_width / 8
    }

    /// Native 8×8 cells down one tileset tile
    pub fn meta_height(&self) -> u32 {
        self.tile_height / 8
    }

    /// Native 8×8 cells across the whole tileset, sentinel not included
    pub fn native_tile_count(&self) -> Result<u32> {
        self.tile_count
            .checked_mul(self.meta_width())
            .and_then(|n| n.checked_mul(self.meta_height()))
            .ok_or_else(|| {
                ConversionError::InvalidDescriptor(format!(
                    "{} tiles of {}x{} overflow the native tile count",
                    self.tile_count, self.tile_width, self.tile_height
                ))
            })
    }
}

/// A single tile layer with the tileset it draws from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapDescriptor {
    pub tileset_path: PathBuf,
    /// One reference per map cell, row-major. 0 is an empty cell.
    pub tile_refs: Vec<u32>,
    pub map_width: u32,
    pub map_height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DocumentFormat {
    Xml,
    Json,
}

fn document_format(path: &Path) -> Result<DocumentFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("tmx") | Some("tsx") | Some("xml") => Ok(DocumentFormat::Xml),
        Some("tmj") | Some("tsj") | Some("json") => Ok(DocumentFormat::Json),
        _ => Err(ConversionError::Tiled(format!(
            "Unrecognised document extension: {}",
            path.display()
        ))),
    }
}

pub fn load_map<P: AsRef<Path>>(path: P) -> Result<MapDescriptor> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    match document_format(path)? {
        DocumentFormat::Xml => tmx::parse_map(&text, path),
        DocumentFormat::Json => tmj::parse_map(&text, path),
    }
}

pub fn load_tileset<P: AsRef<Path>>(path: P) -> Result<TilesetDescriptor> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    match document_format(path)? {
        DocumentFormat::Xml => tmx::parse_tileset(&text, path),
        DocumentFormat::Json => tmj::parse_tileset(&text, path),
    }
}

/// Load a map and the external tileset it references
pub fn load<P: AsRef<Path>>(map_path: P) -> Result<(MapDescriptor, TilesetDescriptor)> {
    let map = load_map(map_path)?;
    let tileset = load_tileset(&map.tileset_path)?;
    Ok((map, tileset))
}

/// Resolve a path found inside a document against the document's own directory
pub(crate) fn resolve_sibling(document: &Path, relative: &str) -> PathBuf {
    match document.parent() {
        Some(dir) => dir.join(relative),
        None => PathBuf::from(relative),
    }
}

/// Parse CSV tile data. Whitespace, including line breaks between rows, is ignored.
pub(crate) fn parse_csv(csv: &str, document: &Path) -> Result<Vec<u32>> {
    let compact: String = csv.split_whitespace().collect();
    if compact.is_empty() {
        return Ok(Vec::new());
    }
    compact
        .split(',')
        .map(|value| {
            value.parse::<u32>().map_err(|_| {
                ConversionError::Tiled(format!(
                    "Could not parse tile reference '{}' in {}",
                    value,
                    document.display()
                ))
            })
        })
        .collect()
}
