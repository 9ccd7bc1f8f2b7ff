//! GhostFrame CLI
//!
//! Command-line interface for inspecting renderer geometry.

use clap::{Parser, Subcommand, ValueEnum};
use ghostframe::{
    AspectRatioMode, CoordinateMapper, GeometryEngine, PointF, RegionOfInterest, RendererConfig,
    Size,
};
use std::path::PathBuf;

/// Aspect-ratio mode for CLI
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Mode {
    /// Stretch to the whole surface
    Surface,
    /// Keep the source ratio
    #[default]
    Video,
    /// Use --ratio
    Custom,
}

impl From<Mode> for AspectRatioMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Surface => AspectRatioMode::Surface,
            Mode::Video => AspectRatioMode::Video,
            Mode::Custom => AspectRatioMode::Custom,
        }
    }
}

#[derive(Parser)]
#[command(name = "ghostframe")]
#[command(about = "Video renderer geometry - out rectangles, coordinate mapping, config")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the out rectangle for a surface and a source frame
    Layout {
        /// Surface size (e.g., 800x800)
        #[arg(short, long)]
        surface: Size,

        /// Source frame size (e.g., 1920x1080)
        #[arg(short = 'i', long, default_value = "1920x1080")]
        source: Size,

        /// Aspect-ratio mode
        #[arg(short, long, value_enum, default_value = "video")]
        mode: Mode,

        /// Custom aspect ratio (e.g., 2.35 or 4:3)
        #[arg(short, long)]
        ratio: Option<String>,
    },

    /// Map a surface point into frame space and back
    Map {
        /// Surface size
        #[arg(short, long)]
        surface: Size,

        /// Source frame size
        #[arg(short = 'i', long, default_value = "1920x1080")]
        source: Size,

        /// Region of interest as x,y,w,h (fractions below 1, pixels otherwise)
        #[arg(long)]
        roi: Option<String>,

        /// Surface X coordinate
        #[arg(allow_negative_numbers = true)]
        x: f64,

        /// Surface Y coordinate
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Print the default config, or validate a config file
    Config {
        /// TOML file to validate
        path: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ghostframe=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Layout {
            surface,
            source,
            mode,
            ratio,
        } => cmd_layout(surface, source, mode, ratio),
        Commands::Map {
            surface,
            source,
            roi,
            x,
            y,
        } => cmd_map(surface, source, roi, x, y),
        Commands::Config { path } => cmd_config(path),
    }
}

/// Parse "2.35", "16:9" or "16/9"
fn parse_ratio(s: &str) -> anyhow::Result<f64> {
    let ratio = match s.split_once([':', '/']) {
        Some((w, h)) => w.trim().parse::<f64>()? / h.trim().parse::<f64>()?,
        None => s.trim().parse()?,
    };
    Ok(ratio)
}

fn parse_roi(s: &str) -> anyhow::Result<RegionOfInterest> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [x, y, w, h] => Ok(RegionOfInterest::new(x, y, w, h)),
        _ => anyhow::bail!("expected x,y,w,h, got '{}'", s),
    }
}

fn cmd_layout(surface: Size, source: Size, mode: Mode, ratio: Option<String>) -> anyhow::Result<()> {
    let mut engine = GeometryEngine::new();
    engine.set_surface_size(surface.width, surface.height);
    engine.set_source_size(source.width, source.height)?;

    match (mode, ratio) {
        (_, Some(ratio)) => {
            engine.set_aspect_ratio_value(parse_ratio(&ratio)?)?;
        }
        (Mode::Custom, None) => anyhow::bail!("custom mode needs --ratio"),
        (mode, None) => {
            engine.set_aspect_ratio_mode(mode.into())?;
        }
    }

    let state = engine.state();
    println!("Surface:      {}", state.surface);
    println!("Source:       {}", state.source);
    println!("Mode:         {:?}", state.mode);
    println!("Aspect ratio: {:.4}", state.aspect_ratio_value);
    println!("Out rect:     {}", state.out_rect);
    println!(
        "Background:   {}",
        if state.background_dirty {
            "needs clearing"
        } else {
            "covered"
        }
    );

    Ok(())
}

fn cmd_map(
    surface: Size,
    source: Size,
    roi: Option<String>,
    x: f64,
    y: f64,
) -> anyhow::Result<()> {
    let roi = match roi {
        Some(s) => parse_roi(&s)?,
        None => RegionOfInterest::full(),
    };
    let mapper = CoordinateMapper::new(surface, source, &roi)?;

    let p = PointF::new(x, y);
    let q = mapper.to_frame(p);
    let back = mapper.to_surface(q);

    let r = mapper.roi();
    println!(
        "ROI:     {:.1}x{:.1}+{:.1}+{:.1}",
        r.width, r.height, r.x, r.y
    );
    println!("Zoom:    {:.4}", mapper.zoom());
    println!("Surface: ({:.3}, {:.3})", p.x, p.y);
    println!("Frame:   ({:.3}, {:.3})", q.x, q.y);
    println!("Back:    ({:.3}, {:.3})", back.x, back.y);

    Ok(())
}

fn cmd_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let config = RendererConfig::load(&path)?;
            println!("{} is valid\n", path.display());
            print!("{}", config.to_toml_string()?);
        }
        None => print!("{}", RendererConfig::default().to_toml_string()?),
    }
    Ok(())
}
