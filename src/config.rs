//! Conversion settings. Defaults suit a plain run; a JSON file can override them and CLI flags
//! override both.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    layer3::{IndexEncoding, TilemapOrder},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the output files are written to
    pub output_dir: PathBuf,
    /// Base name of the output files, defaults to the map's file stem
    pub stem: Option<String>,
    pub tiles_extension: String,
    pub palette_extension: String,
    pub tilemap_extension: String,
    pub tilemap_order: TilemapOrder,
    pub index_encoding: IndexEncoding,
    /// Write a JSON manifest with sizes and checksums
    pub manifest: bool,
    /// Write a rendered PNG of the converted map
    pub preview: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: PathBuf::from("."),
            stem: None,
            tiles_extension: "til".to_string(),
            palette_extension: "nxp".to_string(),
            tilemap_extension: "map".to_string(),
            tilemap_order: TilemapOrder::ColumnMajor,
            index_encoding: IndexEncoding::Truncate,
            manifest: false,
            preview: false,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(file)?)
    }

    /// The configured stem, or the map file's own stem
    pub fn output_stem(&self, map_path: &Path) -> String {
        self.stem.clone().unwrap_or_else(|| {
            map_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "tilemap".to_string())
        })
    }
}
