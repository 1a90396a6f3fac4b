//! # Asset Writer
//!
//! Writes converted Layer 3 data to disk: tile graphics, palette and tilemap as flat binary
//! files, plus an optional JSON manifest and preview image.

use std::{
    fs::{self, File},
    hash::Hasher,
    path::{Path, PathBuf},
};

use log::info;
use serde::Serialize;
use twox_hash::XxHash64;

use crate::{
    config::Config,
    error::Result,
    layer3::{IndexEncoding, Layer3Data, TilemapOrder},
    preview,
    tiled::{MapDescriptor, TilesetDescriptor},
};

/// Where each output of a run ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub tiles: PathBuf,
    pub palette: PathBuf,
    pub tilemap: PathBuf,
    pub manifest: Option<PathBuf>,
    pub preview: Option<PathBuf>,
}

impl OutputPaths {
    pub fn new(config: &Config, map_path: &Path) -> Self {
        let stem = config.output_stem(map_path);
        let dir = &config.output_dir;
        let file = |ext: &str| dir.join(format!("{}.{}", stem, ext));
        OutputPaths {
            tiles: file(&config.tiles_extension),
            palette: file(&config.palette_extension),
            tilemap: file(&config.tilemap_extension),
            manifest: config.manifest.then(|| file("json")),
            preview: config.preview.then(|| file("preview.png")),
        }
    }
}

#[derive(Serialize)]
struct Manifest {
    map: String,
    tileset: String,
    image: String,
    map_width: u32,
    map_height: u32,
    native_map_width: u32,
    native_map_height: u32,
    tile_width: u32,
    tile_height: u32,
    native_tile_count: usize,
    packed_tile_count: usize,
    palette_entries: usize,
    tilemap_order: TilemapOrder,
    index_encoding: IndexEncoding,
    files: Vec<ManifestFile>,
}

#[derive(Serialize)]
struct ManifestFile {
    name: String,
    bytes: usize,
    xxhash64: String,
}

/// 64-bit XxHash of a written buffer
pub fn checksum(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn write_assets(
    data: &Layer3Data,
    config: &Config,
    map_path: &Path,
    map: &MapDescriptor,
    tileset: &TilesetDescriptor,
) -> Result<OutputPaths> {
    let paths = OutputPaths::new(config, map_path);
    fs::create_dir_all(&config.output_dir)?;

    let tilemap = data.tilemap_bytes(config.tilemap_order);
    let buffers: [(&Path, &[u8]); 3] = [
        (paths.tiles.as_path(), data.tiles.as_slice()),
        (paths.palette.as_path(), data.palette.as_slice()),
        (paths.tilemap.as_path(), tilemap.as_slice()),
    ];
    for (path, bytes) in buffers {
        fs::write(path, bytes)?;
        info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    }

    if let Some(manifest_path) = &paths.manifest {
        let manifest = Manifest {
            map: map_path.display().to_string(),
            tileset: map.tileset_path.display().to_string(),
            image: tileset.image_path.display().to_string(),
            map_width: map.map_width,
            map_height: map.map_height,
            native_map_width: data.map_width,
            native_map_height: data.map_height,
            tile_width: tileset.tile_width,
            tile_height: tileset.tile_height,
            native_tile_count: data.native_tile_count(),
            packed_tile_count: data.packed_tile_count(),
            palette_entries: data.palette.len(),
            tilemap_order: config.tilemap_order,
            index_encoding: config.index_encoding,
            files: buffers
                .iter()
                .map(|(path, bytes)| ManifestFile {
                    name: file_name(path),
                    bytes: bytes.len(),
                    xxhash64: format!("{:016x}", checksum(bytes)),
                })
                .collect(),
        };
        let file = File::create(manifest_path)?;
        serde_json::to_writer_pretty(file, &manifest)?;
        info!("Wrote manifest {}", manifest_path.display());
    }

    if let Some(preview_path) = &paths.preview {
        let image = preview::render_preview(data);
        preview::save_preview_png(&image, preview_path)?;
        info!("Wrote preview {}", preview_path.display());
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_config() {
        let config = Config {
            output_dir: PathBuf::from("out"),
            manifest: true,
            ..Config::default()
        };
        let paths = OutputPaths::new(&config, Path::new("maps/forest.tmx"));
        assert_eq!(paths.tiles, PathBuf::from("out/forest.til"));
        assert_eq!(paths.palette, PathBuf::from("out/forest.nxp"));
        assert_eq!(paths.tilemap, PathBuf::from("out/forest.map"));
        assert_eq!(paths.manifest, Some(PathBuf::from("out/forest.json")));
        assert_eq!(paths.preview, None);
    }

    #[test]
    fn checksum_is_stable_and_content_sensitive() {
        assert_eq!(checksum(b"layer3"), checksum(b"layer3"));
        assert_ne!(checksum(b"layer3"), checksum(b"layer4"));
    }
}
