//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "spectra")]
#[command(about = "Layered audio visualizer, rendered headless to PNG frames", long_about = None)]
pub struct Args {
    /// Override the scene's log level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a scene to numbered PNG frames
    Render(RenderArgs),

    /// Write a starter scene file
    Init {
        /// Where to write the scene
        #[arg(value_name = "PATH", default_value = "scene.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Options of `spectra render`
#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Scene file; the built-in default scene if omitted
    #[arg(value_name = "SCENE")]
    pub scene: Option<PathBuf>,

    /// Output directory for frames
    #[arg(short, long, value_name = "DIR", default_value = "frames")]
    pub out: PathBuf,

    /// Number of frames; 0 renders until interrupted
    #[arg(short, long, default_value = "60")]
    pub frames: u64,

    /// FFT detail level 1-6, overriding the scene
    #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(1..=6))]
    pub detail: Option<u8>,

    /// Simulate a live microphone feeding the selected layers
    #[arg(long)]
    pub mic: bool,

    /// Layers to select, by numeric id
    #[arg(long = "select", value_name = "ID")]
    pub select: Vec<u64>,

    /// Preview one layer in transform-edit mode
    #[arg(long, value_name = "ID")]
    pub edit: Option<u64>,

    /// Resize the canvas before a frame, as FRAME:WIDTHxHEIGHT (repeatable)
    #[arg(long = "resize-at", value_name = "FRAME:WxH", value_parser = parse_resize)]
    pub resize_at: Vec<ResizeAt>,
}

/// A scheduled canvas size change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeAt {
    /// Frame index before which the resize happens
    pub frame: u64,
    /// New width in pixels
    pub width: u32,
    /// New height in pixels
    pub height: u32,
}

/// Parse `FRAME:WIDTHxHEIGHT`
pub fn parse_resize(value: &str) -> Result<ResizeAt, String> {
    let (frame, size) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FRAME:WxH, got '{}'", value))?;
    let (width, height) = size
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", size))?;

    let frame = frame
        .trim()
        .parse()
        .map_err(|e| format!("invalid frame '{}': {}", frame, e))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|e| format!("invalid width '{}': {}", width, e))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|e| format!("invalid height '{}': {}", height, e))?;
    if width == 0 || height == 0 {
        return Err(format!("canvas size must be non-zero, got {}x{}", width, height));
    }

    Ok(ResizeAt {
        frame,
        width,
        height,
    })
}
