//! # TMJ / TSJ
//!
//! JSON map and tileset documents.

use std::path::Path;

use serde::Deserialize;

use super::{parse_csv, resolve_sibling, MapDescriptor, TilesetDescriptor};
use crate::error::{ConversionError, Result};

#[derive(Deserialize)]
struct MapJson {
    width: u32,
    height: u32,
    #[serde(default)]
    layers: Vec<LayerJson>,
    #[serde(default)]
    tilesets: Vec<TilesetRefJson>,
}

#[derive(Deserialize)]
struct LayerJson {
    #[serde(rename = "type")]
    kind: String,
    width: Option<u32>,
    height: Option<u32>,
    encoding: Option<String>,
    data: Option<LayerData>,
    #[serde(default)]
    layers: Vec<LayerJson>,
}

/// Tiled writes either an integer array or, with csv encoding, a string
#[derive(Deserialize)]
#[serde(untagged)]
enum LayerData {
    Array(Vec<u32>),
    Text(String),
}

#[derive(Deserialize)]
struct TilesetRefJson {
    source: Option<String>,
}

#[derive(Deserialize)]
struct TilesetJson {
    tilewidth: u32,
    tileheight: u32,
    tilecount: u32,
    columns: u32,
    image: String,
    imagewidth: u32,
    imageheight: u32,
}

pub fn parse_map(text: &str, document: &Path) -> Result<MapDescriptor> {
    let map: MapJson = serde_json::from_str(text)?;

    let layer = first_tile_layer(&map.layers).ok_or_else(|| {
        tiled_error(
            "No tile layers found in map, there must be at least one layer",
            document,
        )
    })?;

    let tile_refs = match (&layer.data, layer.encoding.as_deref()) {
        (Some(LayerData::Array(refs)), _) => refs.clone(),
        (Some(LayerData::Text(csv)), Some("csv")) => parse_csv(csv, document)?,
        (Some(LayerData::Text(_)), encoding) => {
            return Err(tiled_error(
                &format!(
                    "Layer data uses '{}' encoding, only csv is supported",
                    encoding.unwrap_or("unknown")
                ),
                document,
            ))
        }
        (None, _) => {
            return Err(tiled_error(
                "First tile layer has no data, infinite maps are not supported",
                document,
            ))
        }
    };

    if map.tilesets.len() != 1 {
        return Err(tiled_error("There must be one tileset defined", document));
    }
    let source = map.tilesets[0].source.as_deref().ok_or_else(|| {
        tiled_error(
            "tileset does not have a source, the map must define an external tileset",
            document,
        )
    })?;

    Ok(MapDescriptor {
        tileset_path: resolve_sibling(document, source),
        tile_refs,
        map_width: layer.width.unwrap_or(map.width),
        map_height: layer.height.unwrap_or(map.height),
    })
}

pub fn parse_tileset(text: &str, document: &Path) -> Result<TilesetDescriptor> {
    let tileset: TilesetJson = serde_json::from_str(text)?;
    Ok(TilesetDescriptor {
        image_path: resolve_sibling(document, &tileset.image),
        image_width: tileset.imagewidth,
        image_height: tileset.imageheight,
        tile_width: tileset.tilewidth,
        tile_height: tileset.tileheight,
        tile_count: tileset.tilecount,
        columns: tileset.columns,
    })
}

fn first_tile_layer(layers: &[LayerJson]) -> Option<&LayerJson> {
    for layer in layers {
        match layer.kind.as_str() {
            "tilelayer" => return Some(layer),
            "group" => {
                if let Some(found) = first_tile_layer(&layer.layers) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn tiled_error(message: &str, document: &Path) -> ConversionError {
    ConversionError::Tiled(format!("{} File: {}", message, document.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TMJ: &str = r#"{
        "width": 2, "height": 2, "tilewidth": 8, "tileheight": 8,
        "layers": [
            { "type": "objectgroup", "name": "spawns", "objects": [] },
            { "type": "group", "layers": [
                { "type": "tilelayer", "width": 2, "height": 2, "data": [1, 0, 3, 2] }
            ]}
        ],
        "tilesets": [{ "firstgid": 1, "source": "town.tsj" }]
    }"#;

    #[test]
    fn parses_array_layer_inside_group() {
        let map = parse_map(TMJ, Path::new("levels/town.tmj")).unwrap();
        assert_eq!(map.tile_refs, vec![1, 0, 3, 2]);
        assert_eq!((map.map_width, map.map_height), (2, 2));
        assert_eq!(map.tileset_path, PathBuf::from("levels/town.tsj"));
    }

    #[test]
    fn parses_csv_string_layer() {
        let tmj = r#"{ "width": 2, "height": 1,
            "layers": [{ "type": "tilelayer", "encoding": "csv", "data": "4,\n5" }],
            "tilesets": [{ "firstgid": 1, "source": "a.tsj" }] }"#;
        let map = parse_map(tmj, Path::new("a.tmj")).unwrap();
        assert_eq!(map.tile_refs, vec![4, 5]);
        assert_eq!(map.map_width, 2);
    }

    #[test]
    fn rejects_base64_layers() {
        let tmj = r#"{ "width": 1, "height": 1,
            "layers": [{ "type": "tilelayer", "encoding": "base64", "data": "AQAAAA==" }],
            "tilesets": [{ "firstgid": 1, "source": "a.tsj" }] }"#;
        assert!(matches!(
            parse_map(tmj, Path::new("a.tmj")),
            Err(ConversionError::Tiled(_))
        ));
    }

    #[test]
    fn rejects_embedded_tileset() {
        let tmj = r#"{ "width": 1, "height": 1,
            "layers": [{ "type": "tilelayer", "data": [1] }],
            "tilesets": [{ "firstgid": 1, "name": "inline" }] }"#;
        assert!(parse_map(tmj, Path::new("a.tmj")).is_err());
    }

    #[test]
    fn parses_tileset() {
        let tsj = r#"{ "tilewidth": 8, "tileheight": 16, "tilecount": 6, "columns": 3,
            "image": "../gfx/town.png", "imagewidth": 24, "imageheight": 32 }"#;
        let tileset = parse_tileset(tsj, Path::new("levels/town.tsj")).unwrap();
        assert_eq!(tileset.tile_height, 16);
        assert_eq!(tileset.columns, 3);
        assert_eq!(tileset.image_path, PathBuf::from("levels/../gfx/town.png"));
    }
}
