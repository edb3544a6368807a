//! Spectra - layered audio visualizer
//!
//! Headless driver: loads a scene, runs the compositor against a synthetic
//! audio feed and writes every frame as a PNG.

#![warn(missing_docs)]

mod cli;
mod feed;
mod logging_setup;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Args, Command, RenderArgs};
use feed::SyntheticFeed;
use spectra_core::{Compositor, LayerId, Scene, VisualizerKind};
use spectra_render::PixmapSurface;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

fn load_scene(path: Option<&Path>) -> Result<Scene> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read scene {}", path.display()))?;
            Scene::from_json(&json).with_context(|| format!("Invalid scene {}", path.display()))
        }
        None => Ok(Scene::default()),
    }
}

/// The scene written by `spectra init`
fn starter_scene() -> Scene {
    let mut scene = Scene {
        name: "Starter".to_string(),
        ..Default::default()
    };
    let layers = &mut scene.layers;
    let circle = layers.add_layer(VisualizerKind::Circle);
    layers.set_opacity(circle, 0.8);
    layers.add_layer(VisualizerKind::Constellation);
    scene
}

fn init_scene(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let json = starter_scene().to_json()?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn render(mut scene: Scene, args: &RenderArgs) -> Result<()> {
    if let Some(detail) = args.detail {
        scene.fft_detail = detail;
    }
    scene.validate()?;

    let store = &mut scene.layers;
    for id in args.select.iter().copied().map(LayerId) {
        if store.get(id).is_none() {
            bail!("--select: no layer with id {}", id.0);
        }
        if !store.is_selected(id) {
            store.toggle_selection(id);
        }
    }
    if let Some(id) = args.edit {
        if !store.begin_transform_edit(LayerId(id)) {
            bail!("--edit: no layer with id {}", id);
        }
    }

    fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {}", args.out.display()))?;

    let mut surface = PixmapSurface::new(scene.canvas.width, scene.canvas.height)?;
    let mut compositor = Compositor::new(scene.background);
    let mut feed = SyntheticFeed::new(scene.fft_detail, args.mic);
    let frame_time = 1.0 / scene.canvas.fps;

    info!(
        scene = %scene.name,
        layers = scene.layers.len(),
        bins = feed.len(),
        frames = args.frames,
        out = %args.out.display(),
        "Rendering"
    );

    let started = Instant::now();
    let mut frame: u64 = 0;
    while args.frames == 0 || frame < args.frames {
        for resize in args.resize_at.iter().filter(|r| r.frame == frame) {
            info!(frame, width = resize.width, height = resize.height, "Resizing canvas");
            surface.resize(resize.width, resize.height)?;
        }

        feed.advance(frame as f32 * frame_time, &scene.layers);
        let stats = compositor.render_frame(&mut surface, &mut scene.layers, &feed);
        debug!(
            frame,
            mode = ?stats.mode,
            drawn = stats.layers_drawn,
            resized = stats.resized,
            "Frame done"
        );

        let path = args.out.join(format!("frame_{:05}.png", frame));
        surface.save_png(&path)?;
        frame += 1;
    }

    info!(
        frames = frame,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Init { path, force } => init_scene(&path, force),
        Command::Render(render_args) => {
            let mut scene = load_scene(render_args.scene.as_deref())?;
            if let Some(level) = &args.log_level {
                scene.log.level = level.clone();
            }
            let _log_guard = logging_setup::init(&scene.log)?;
            render(scene, &render_args)
        }
    }
}
