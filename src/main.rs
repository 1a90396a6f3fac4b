use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tmx_layer3::{Config, IndexEncoding};

/// Convert a Tiled map into ZX Next Layer 3 tiles, palette and tilemap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tiled map file (.tmx or .tmj)
    map: PathBuf,
    /// JSON settings file, flags below take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Base name for output files (default: map file name)
    #[arg(short = 'n', long)]
    stem: Option<String>,
    /// Write the tilemap in row-major order instead of column-major
    #[arg(long)]
    row_major: bool,
    /// How tile indices are stored in tilemap entries
    #[arg(short, long, value_enum)]
    index_encoding: Option<IndexEncoding>,
    /// Also write a JSON manifest with sizes and checksums
    #[arg(short, long)]
    manifest: bool,
    /// Also write a PNG preview of the converted map
    #[arg(short, long)]
    preview: bool,
}

impl Args {
    fn into_config(self) -> tmx_layer3::Result<(PathBuf, Config)> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if self.stem.is_some() {
            config.stem = self.stem;
        }
        if self.row_major {
            config.tilemap_order = tmx_layer3::TilemapOrder::RowMajor;
        }
        if let Some(encoding) = self.index_encoding {
            config.index_encoding = encoding;
        }
        config.manifest |= self.manifest;
        config.preview |= self.preview;
        Ok((self.map, config))
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (map_path, config) = match Args::parse().into_config() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match tmx_layer3::run(&map_path, &config) {
        Ok(paths) => {
            println!("Tiles:   {}", paths.tiles.display());
            println!("Palette: {}", paths.palette.display());
            println!("Tilemap: {}", paths.tilemap.display());
            if let Some(manifest) = &paths.manifest {
                println!("Manifest: {}", manifest.display());
            }
            if let Some(preview) = &paths.preview {
                println!("Preview: {}", preview.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error converting {}: {}", map_path.display(), e);
            ExitCode::FAILURE
        }
    }
}
