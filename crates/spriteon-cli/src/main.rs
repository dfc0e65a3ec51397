use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use spriteon_core::{
    project, remap_faces, CameraPosition, DetectedFace, FrameGeometry, Platform, RemappedFace,
    SensorOrientation, SpritePlacement, Tuning,
};

#[derive(Parser)]
#[command(name = "spriteon", about = "Spriteon AR compositing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Composite sprites onto a captured photo from raw detection JSON
    Compose {
        /// Captured photo (JPEG/PNG)
        #[arg(long)]
        photo: String,
        /// Sprite image (PNG with alpha recommended)
        #[arg(long)]
        sprite: String,
        /// Raw detector output: JSON array of faces
        #[arg(long)]
        faces: String,
        #[command(flatten)]
        geometry: GeometryArgs,
        /// Output path for the composited JPEG
        #[arg(short, long)]
        output: String,
    },
    /// Print remapped bounds and sprite placements as JSON
    Project {
        /// Raw detector output: JSON array of faces
        #[arg(long)]
        faces: String,
        #[command(flatten)]
        geometry: GeometryArgs,
        /// Render target size as WIDTHxHEIGHT, e.g. 390x844
        #[arg(long)]
        viewport: String,
    },
}

/// Camera session context, mirrored from the capture metadata.
#[derive(Args)]
struct GeometryArgs {
    /// Frame width in sensor pixel order
    #[arg(long)]
    frame_width: f64,
    /// Frame height in sensor pixel order
    #[arg(long)]
    frame_height: f64,
    #[arg(long, value_enum, default_value = "portrait")]
    sensor_orientation: OrientationArg,
    #[arg(long, value_enum, default_value = "back")]
    position: PositionArg,
    #[arg(long, value_enum)]
    platform: PlatformArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

#[derive(Clone, Copy, ValueEnum)]
enum PositionArg {
    Front,
    Back,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    Ios,
    Android,
}

impl GeometryArgs {
    fn to_geometry(&self) -> FrameGeometry {
        FrameGeometry {
            frame_width: self.frame_width,
            frame_height: self.frame_height,
            sensor_orientation: match self.sensor_orientation {
                OrientationArg::Portrait => SensorOrientation::Portrait,
                OrientationArg::PortraitUpsideDown => SensorOrientation::PortraitUpsideDown,
                OrientationArg::LandscapeLeft => SensorOrientation::LandscapeLeft,
                OrientationArg::LandscapeRight => SensorOrientation::LandscapeRight,
            },
            position: match self.position {
                PositionArg::Front => CameraPosition::Front,
                PositionArg::Back => CameraPosition::Back,
            },
            platform: match self.platform {
                PlatformArg::Ios => Platform::Ios,
                PlatformArg::Android => Platform::Android,
            },
        }
    }
}

#[derive(Serialize)]
struct ProjectedFace {
    remapped: RemappedFace,
    placement: SpritePlacement,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compose {
            photo,
            sprite,
            faces,
            geometry,
            output,
        } => run_compose(&photo, &sprite, &faces, &geometry.to_geometry(), &output),
        Commands::Project {
            faces,
            geometry,
            viewport,
        } => run_project(&faces, &geometry.to_geometry(), &viewport),
    }
}

fn load_faces(path: &str, geometry: &FrameGeometry) -> Result<Vec<RemappedFace>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read faces file {path}"))?;
    let raw: Vec<DetectedFace> =
        serde_json::from_str(&json).context("faces file is not a JSON array of detections")?;
    let remapped = remap_faces(&raw, geometry);
    tracing::debug!(raw = raw.len(), remapped = remapped.len(), "faces loaded");
    Ok(remapped)
}

fn run_compose(
    photo_path: &str,
    sprite_path: &str,
    faces_path: &str,
    geometry: &FrameGeometry,
    output_path: &str,
) -> Result<()> {
    let photo = std::fs::read(photo_path)
        .with_context(|| format!("failed to read photo {photo_path}"))?;
    let sprite = std::fs::read(sprite_path)
        .with_context(|| format!("failed to read sprite {sprite_path}"))?;
    let faces = load_faces(faces_path, geometry)?;

    let compositor = spriteon_compose::Compositor::new(Tuning::from_env());
    let composed = compositor.compose(&photo, &sprite, geometry, &faces)?;

    std::fs::write(output_path, &composed.data)
        .with_context(|| format!("failed to write {output_path}"))?;

    println!(
        "{output_path}: {}x{}, {} sprite(s) composited",
        composed.width, composed.height, composed.faces_composited
    );
    Ok(())
}

fn run_project(faces_path: &str, geometry: &FrameGeometry, viewport: &str) -> Result<()> {
    let (width, height) = parse_viewport(viewport)?;
    let faces = load_faces(faces_path, geometry)?;
    let tuning = Tuning::from_env();
    let mirror_x = geometry.mirrors_x();

    let projected: Vec<ProjectedFace> = faces
        .into_iter()
        .map(|remapped| {
            let placement = project(&remapped, width, height, mirror_x, &tuning);
            ProjectedFace { remapped, placement }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&projected)?);
    Ok(())
}

fn parse_viewport(s: &str) -> Result<(f64, f64)> {
    let (w, h) = s
        .split_once('x')
        .context("viewport must look like 390x844")?;
    let width: f64 = w.trim().parse().context("bad viewport width")?;
    let height: f64 = h.trim().parse().context("bad viewport height")?;
    anyhow::ensure!(width > 0.0 && height > 0.0, "viewport must be positive");
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport() {
        assert_eq!(parse_viewport("390x844").unwrap(), (390.0, 844.0));
        assert_eq!(parse_viewport("1080 x 1920").unwrap(), (1080.0, 1920.0));
        assert!(parse_viewport("390").is_err());
        assert!(parse_viewport("0x100").is_err());
    }
}
