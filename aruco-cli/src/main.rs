use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use aruco::render::{pad, render_marker};
use aruco::{Detector, DetectorConfig, Dimension, Frame, ImageU8, Point};

/// ArUco marker detection and rendering CLI
#[derive(Parser)]
#[command(name = "aruco", version)]
struct Cli {
    /// Log pipeline stages to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect markers in PNG/JPEG images and print JSON, one line per image
    Detect {
        /// Input image files (PNG or JPEG)
        #[arg(required = true)]
        images: Vec<String>,
        /// Marker grid dimension (3, 4 or 5), overriding the config file
        #[arg(short, long)]
        dimension: Option<usize>,
        /// TOML file with detector settings
        #[arg(short, long)]
        config: Option<String>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Render a marker as a grayscale PNG
    Render {
        /// Marker id
        #[arg(long)]
        id: u32,
        /// Marker grid dimension (3, 4 or 5)
        #[arg(short, long, default_value = "5")]
        dimension: usize,
        /// Pixels per marker cell
        #[arg(long, default_value = "20")]
        cell_size: u32,
        /// White margin around the marker, in cells
        #[arg(long, default_value = "1")]
        margin: u32,
        /// Output file path
        #[arg(short, long, default_value = "marker.png")]
        output: String,
    },
}

#[derive(Serialize)]
struct OutputResult {
    file: String,
    image_width: u32,
    image_height: u32,
    markers: Vec<OutputMarker>,
}

#[derive(Serialize)]
struct OutputMarker {
    id: u32,
    corners: [Point; 4],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Command::Detect {
            images,
            dimension,
            config,
            pretty,
        } => cmd_detect(&images, dimension, config.as_deref(), pretty),
        Command::Render {
            id,
            dimension,
            cell_size,
            margin,
            output,
        } => cmd_render(id, dimension, cell_size, margin, &output),
    }
}

fn load_config(path: Option<&str>) -> Result<DetectorConfig> {
    let Some(path) = path else {
        return Ok(DetectorConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    DetectorConfig::from_toml_str(&text).with_context(|| format!("parsing detector config {path}"))
}

fn load_image(path: &str) -> Result<ImageU8> {
    let img = image::open(path)
        .with_context(|| format!("failed to open image: {path}"))?
        .into_luma8();

    let width = img.width();
    let height = img.height();
    let pixels = img.into_raw();

    Ok(ImageU8::from_buf(width, height, width, pixels)?)
}

fn cmd_detect(
    images: &[String],
    dimension: Option<usize>,
    config: Option<&str>,
    pretty: bool,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(dimension) = dimension {
        config.dimension = Dimension::try_from(dimension)?;
    }
    let mut detector = Detector::with_config(config);

    for image_path in images {
        let img = load_image(image_path)?;
        info!("detecting in {} ({}x{})", image_path, img.width, img.height);

        let markers = detector
            .detect(&Frame::from(&img))
            .with_context(|| format!("detecting markers in {image_path}"))?;
        info!("  found {} markers", markers.len());

        let result = OutputResult {
            file: image_path.clone(),
            image_width: img.width,
            image_height: img.height,
            markers: markers
                .iter()
                .map(|m| OutputMarker {
                    id: m.id,
                    corners: m.corners,
                })
                .collect(),
        };

        let json = if pretty {
            serde_json::to_string_pretty(&result)?
        } else {
            serde_json::to_string(&result)?
        };
        println!("{json}");
    }

    Ok(())
}

fn cmd_render(id: u32, dimension: usize, cell_size: u32, margin: u32, output: &str) -> Result<()> {
    let dimension = Dimension::try_from(dimension)?;
    anyhow::ensure!(cell_size > 0, "cell size must be positive");
    let marker = render_marker(id, dimension, cell_size).with_context(|| {
        let n = dimension.size();
        let max = dimension.id_count() - 1;
        format!("id {id} out of range for {n}x{n} markers (max {max})")
    })?;
    let img = pad(&marker, margin * cell_size, 255);

    image::GrayImage::from_raw(img.width, img.height, img.buf)
        .context("rendered image has inconsistent size")?
        .save(output)
        .with_context(|| format!("writing {output}"))?;
    info!("wrote {output} ({}x{})", img.width, img.height);
    Ok(())
}
