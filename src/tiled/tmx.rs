//! # TMX / TSX
//!
//! XML map and tileset documents. The map must use CSV layer data and reference exactly one
//! external tileset.

use std::path::Path;

use xml_dom::level2::{Node, NodeType, RefNode};

use super::{parse_csv, resolve_sibling, MapDescriptor, TilesetDescriptor};
use crate::error::{ConversionError, Result};

pub fn parse_map(text: &str, document: &Path) -> Result<MapDescriptor> {
    let root = root_element(text, document)?;
    if root.local_name() != "map" {
        return Err(tiled_error(
            "Does not appear to be a valid tmx file, root element must be 'map'",
            document,
        ));
    }

    let layer = find_descendant(&root, "layer").ok_or_else(|| {
        tiled_error(
            "No layers found in tmx file, there must be at least one layer",
            document,
        )
    })?;

    let data = child_elements(&layer, "data")
        .into_iter()
        .next()
        .ok_or_else(|| {
            tiled_error(
                "First layer must have a data element for csv tilemap data",
                document,
            )
        })?;

    if let Some(encoding) = attribute(&data, "encoding") {
        if encoding != "csv" {
            return Err(tiled_error(
                &format!("Layer data uses '{}' encoding, only csv is supported", encoding),
                document,
            ));
        }
    }

    let csv: String = data
        .child_nodes()
        .iter()
        .filter(|n| n.node_type() == NodeType::Text)
        .filter_map(|n| n.node_value())
        .collect();
    let tile_refs = parse_csv(&csv, document)?;

    // Layers normally carry their own size, older exports only set it on the map
    let map_width = match attribute(&layer, "width") {
        Some(_) => int_attribute(&layer, "width", document)?,
        None => int_attribute(&root, "width", document)?,
    };
    let map_height = match attribute(&layer, "height") {
        Some(_) => int_attribute(&layer, "height", document)?,
        None => int_attribute(&root, "height", document)?,
    };

    let tilesets = child_elements(&root, "tileset");
    if tilesets.len() != 1 {
        return Err(tiled_error("There must be one tileset defined", document));
    }
    let source = attribute(&tilesets[0], "source").ok_or_else(|| {
        tiled_error(
            "tileset does not have a source attribute, unable to determine tileset file. \
             The tmx file must define an external tileset.",
            document,
        )
    })?;

    Ok(MapDescriptor {
        tileset_path: resolve_sibling(document, &source),
        tile_refs,
        map_width,
        map_height,
    })
}

pub fn parse_tileset(text: &str, document: &Path) -> Result<TilesetDescriptor> {
    let root = root_element(text, document)?;
    if root.local_name() != "tileset" {
        return Err(tiled_error(
            "Does not appear to be a valid tsx file, root element must be 'tileset'",
            document,
        ));
    }

    let tile_width = int_attribute(&root, "tilewidth", document)?;
    let tile_height = int_attribute(&root, "tileheight", document)?;
    let tile_count = int_attribute(&root, "tilecount", document)?;
    let columns = int_attribute(&root, "columns", document)?;

    let images = child_elements(&root, "image");
    if images.len() != 1 {
        return Err(tiled_error(
            "Tileset must contain exactly one image element",
            document,
        ));
    }
    let image = &images[0];
    let image_width = int_attribute(image, "width", document)?;
    let image_height = int_attribute(image, "height", document)?;
    let source = attribute(image, "source")
        .ok_or_else(|| tiled_error("No source attribute found on image element", document))?;

    Ok(TilesetDescriptor {
        image_path: resolve_sibling(document, &source),
        image_width,
        image_height,
        tile_width,
        tile_height,
        tile_count,
        columns,
    })
}

fn tiled_error(message: &str, document: &Path) -> ConversionError {
    ConversionError::Tiled(format!("{} File: {}", message, document.display()))
}

fn root_element(text: &str, document: &Path) -> Result<RefNode> {
    let dom = xml_dom::parser::read_xml(text)
        .map_err(|e| ConversionError::Xml(format!("{}: {:?}", document.display(), e)))?;
    dom.child_nodes()
        .into_iter()
        .find(|n| n.node_type() == NodeType::Element)
        .ok_or_else(|| tiled_error("Document has no root element", document))
}

fn child_elements(node: &RefNode, name: &str) -> Vec<RefNode> {
    node.child_nodes()
        .into_iter()
        .filter(|n| n.node_type() == NodeType::Element && n.local_name() == name)
        .collect()
}

/// Depth-first search, so layers nested in groups are still found in document order
fn find_descendant(node: &RefNode, name: &str) -> Option<RefNode> {
    for child in node.child_nodes() {
        if child.node_type() != NodeType::Element {
            continue;
        }
        if child.local_name() == name {
            return Some(child);
        }
        if let Some(found) = find_descendant(&child, name) {
            return Some(found);
        }
    }
    None
}

fn attribute(node: &RefNode, name: &str) -> Option<String> {
    for (key, value) in &node.attributes() {
        if key.local_name() == name {
            return value
                .first_child()
                .and_then(|text| text.node_value())
                .or_else(|| value.node_value());
        }
    }
    None
}

fn int_attribute(node: &RefNode, name: &str, document: &Path) -> Result<u32> {
    let value = attribute(node, name).filter(|v| !v.is_empty()).ok_or_else(|| {
        tiled_error(
            &format!("No {} attribute found on {} element.", name, node.local_name()),
            document,
        )
    })?;
    value.trim().parse::<u32>().map_err(|_| {
        tiled_error(
            &format!("Could not parse int value of {} ('{}')", name, value),
            document,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TMX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="3" height="2" tilewidth="8" tileheight="8">
 <tileset firstgid="1" source="forest.tsx"/>
 <layer id="1" name="Tile Layer 1" width="3" height="2">
  <data encoding="csv">
1,2,3,
4,0,5
</data>
 </layer>
</map>
"#;

    const TSX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" name="forest" tilewidth="16" tileheight="8" tilecount="8" columns="4">
 <image source="forest.png" width="64" height="16"/>
</tileset>
"#;

    #[test]
    fn parses_csv_map() {
        let map = parse_map(TMX, Path::new("maps/level.tmx")).unwrap();
        assert_eq!(map.map_width, 3);
        assert_eq!(map.map_height, 2);
        assert_eq!(map.tile_refs, vec![1, 2, 3, 4, 0, 5]);
        assert_eq!(map.tileset_path, PathBuf::from("maps/forest.tsx"));
    }

    #[test]
    fn parses_tileset() {
        let tileset = parse_tileset(TSX, Path::new("maps/forest.tsx")).unwrap();
        assert_eq!(tileset.tile_width, 16);
        assert_eq!(tileset.tile_height, 8);
        assert_eq!(tileset.tile_count, 8);
        assert_eq!(tileset.columns, 4);
        assert_eq!(tileset.image_width, 64);
        assert_eq!(tileset.image_height, 16);
        assert_eq!(tileset.image_path, PathBuf::from("maps/forest.png"));
    }

    #[test]
    fn rejects_embedded_tileset() {
        let tmx = TMX.replace(
            r#"<tileset firstgid="1" source="forest.tsx"/>"#,
            r#"<tileset firstgid="1" name="inline" tilewidth="8" tileheight="8"/>"#,
        );
        assert!(matches!(
            parse_map(&tmx, Path::new("level.tmx")),
            Err(ConversionError::Tiled(_))
        ));
    }

    #[test]
    fn rejects_base64_layers() {
        let tmx = TMX.replace(r#"encoding="csv""#, r#"encoding="base64""#);
        assert!(parse_map(&tmx, Path::new("level.tmx")).is_err());
    }

    #[test]
    fn rejects_map_without_layers() {
        let tmx = r#"<map width="1" height="1"><tileset firstgid="1" source="a.tsx"/></map>"#;
        assert!(matches!(
            parse_map(tmx, Path::new("level.tmx")),
            Err(ConversionError::Tiled(_))
        ));
    }

    #[test]
    fn rejects_wrong_root_for_tileset() {
        assert!(parse_tileset(TMX, Path::new("level.tmx")).is_err());
    }

    #[test]
    fn missing_tileset_attribute_is_reported() {
        let tsx = TSX.replace(r#" columns="4""#, "");
        let err = parse_tileset(&tsx, Path::new("forest.tsx")).unwrap_err();
        assert!(err.to_string().contains("columns"));
    }
}
