use spectra_core::{
    Affine2, AudioFeed, Compositor, Gradient, GradientKind, LayerId, LayerStore, Paint, Rgb, Rgba,
    Shape, Surface, Vec2, VisualizerKind,
};
use spectra_render::{PixmapSurface, RenderError};
use std::sync::Arc;

struct Engine(Vec<u8>);

impl AudioFeed for Engine {
    fn engine_spectrum(&self) -> &[u8] {
        &self.0
    }

    fn microphone_spectrum(&self) -> Option<&[u8]> {
        None
    }

    fn media_spectrum(&self, _layer: LayerId) -> Option<&[u8]> {
        None
    }
}

fn red_square() -> Shape {
    Shape::Rect {
        origin: Vec2::new(0.0, 0.0),
        size: Vec2::new(10.0, 10.0),
    }
}

#[test]
fn test_clear_and_fill() {
    let mut surface = PixmapSurface::new(20, 20).unwrap();
    surface.clear(Rgba::BLACK);
    surface.fill(&red_square(), &Paint::solid(Rgb::new(255, 0, 0)));

    assert_eq!(surface.pixel(5, 5), Some([255, 0, 0, 255]));
    assert_eq!(surface.pixel(15, 15), Some([0, 0, 0, 255]));
    assert_eq!(surface.pixel(25, 5), None);
}

#[test]
fn test_global_alpha_blends() {
    let mut surface = PixmapSurface::new(20, 20).unwrap();
    surface.clear(Rgba::BLACK);
    surface.set_global_alpha(0.5);
    surface.fill(&red_square(), &Paint::solid(Rgb::WHITE));

    let [r, g, b, a] = surface.pixel(5, 5).unwrap();
    assert_eq!(a, 255);
    assert!((126..=129).contains(&r));
    assert_eq!((r, g), (g, b));
}

#[test]
fn test_restore_undoes_transform_and_alpha() {
    let mut surface = PixmapSurface::new(40, 20).unwrap();
    surface.clear(Rgba::BLACK);

    surface.save();
    surface.set_global_alpha(0.0);
    surface.concat_transform(Affine2::from_translation(Vec2::new(20.0, 0.0)));
    surface.fill(&red_square(), &Paint::solid(Rgb::WHITE));
    surface.restore();

    assert_eq!(surface.global_alpha(), 1.0);
    surface.fill(&red_square(), &Paint::solid(Rgb::WHITE));
    assert_eq!(surface.pixel(5, 5), Some([255, 255, 255, 255]));
    assert_eq!(surface.pixel(25, 5), Some([0, 0, 0, 255]));
}

#[test]
fn test_transform_moves_shapes() {
    let mut surface = PixmapSurface::new(40, 20).unwrap();
    surface.clear(Rgba::BLACK);
    surface.concat_transform(Affine2::from_translation(Vec2::new(20.0, 0.0)));
    surface.fill(&red_square(), &Paint::solid(Rgb::WHITE));

    assert_eq!(surface.pixel(5, 5), Some([0, 0, 0, 255]));
    assert_eq!(surface.pixel(25, 5), Some([255, 255, 255, 255]));
}

#[test]
fn test_linear_gradient_spans_shape() {
    let mut surface = PixmapSurface::new(100, 4).unwrap();
    let gradient = Gradient::new(
        GradientKind::Linear {
            start: Vec2::ZERO,
            end: Vec2::new(100.0, 0.0),
        },
        [(0.0, Rgb::BLACK), (1.0, Rgb::WHITE)],
    );
    surface.fill(
        &Shape::Rect {
            origin: Vec2::ZERO,
            size: Vec2::new(100.0, 4.0),
        },
        &Paint::Gradient(Arc::new(gradient)),
    );

    let left = surface.pixel(2, 2).unwrap()[0];
    let right = surface.pixel(97, 2).unwrap()[0];
    assert!(left < 20);
    assert!(right > 235);
}

#[test]
fn test_conic_gradient_is_sampled_per_shape() {
    let mut surface = PixmapSurface::new(20, 20).unwrap();
    let gradient = Arc::new(Gradient::new(
        GradientKind::Conic {
            center: Vec2::new(10.0, 10.0),
            start_angle: 0.0,
        },
        [(0.0, Rgb::new(255, 0, 0)), (1.0, Rgb::new(255, 0, 0))],
    ));
    surface.fill(
        &Shape::Circle {
            center: Vec2::new(15.0, 10.0),
            radius: 3.0,
        },
        &Paint::Gradient(gradient),
    );
    assert_eq!(surface.pixel(15, 10), Some([255, 0, 0, 255]));
}

#[test]
fn test_conic_gradient_sweeps_around_spokes() {
    let mut surface = PixmapSurface::new(100, 100).unwrap();
    let center = Vec2::new(50.0, 50.0);
    let gradient = Arc::new(Gradient::new(
        GradientKind::Conic {
            center,
            // Just before the top spoke
            start_angle: -std::f32::consts::FRAC_PI_2 - 0.1,
        },
        [(0.0, Rgb::new(255, 0, 0)), (1.0, Rgb::new(0, 0, 255))],
    ));
    // Top, right, bottom, left
    let spokes = [
        Vec2::new(0.0, -1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(-1.0, 0.0),
    ];
    let segments = spokes
        .iter()
        .map(|dir| (center + *dir * 10.0, center + *dir * 30.0))
        .collect();
    surface.stroke(&Shape::Segments(segments), &Paint::Gradient(gradient), 4.0);

    let reds: Vec<u8> = [(50, 30), (70, 50), (50, 70), (30, 50)]
        .iter()
        .map(|&(x, y)| surface.pixel(x, y).unwrap()[0])
        .collect();
    assert!(reds[0] > 240);
    assert!(reds.windows(2).all(|pair| pair[0] > pair[1]), "{:?}", reds);
    assert!(surface.pixel(30, 50).unwrap()[2] > 150);
}

#[test]
fn test_compositor_renders_png() {
    let mut store = LayerStore::new();
    store.add_layer(VisualizerKind::Circle);
    store.add_layer(VisualizerKind::Constellation);
    let mut compositor = Compositor::default();
    let mut surface = PixmapSurface::new(160, 120).unwrap();
    let feed = Engine((0..64).map(|i| 255 - i as u8 * 3).collect());

    let stats = compositor.render_frame(&mut surface, &mut store, &feed);
    assert_eq!(stats.layers_drawn, 3);

    // Bars grow from the bottom, so the lowest row has color
    let [r, g, b, _] = surface.pixel(1, 119).unwrap();
    assert!(r as u32 + g as u32 + b as u32 > 0);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame_00000.png");
    surface.save_png(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(bytes, surface.encode_png().unwrap());
}

#[test]
fn test_resize_reallocates() {
    let mut surface = PixmapSurface::new(10, 10).unwrap();
    surface.resize(30, 20).unwrap();
    assert_eq!(surface.size(), Vec2::new(30.0, 20.0));
    assert!(matches!(surface.resize(0, 5), Err(RenderError::ZeroSize { .. })));
}

#[test]
fn test_missing_directory_is_a_png_error() {
    let surface = PixmapSurface::new(4, 4).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = surface.save_png(dir.path().join("missing/frame.png")).unwrap_err();
    assert!(matches!(err, RenderError::Png(_)));
}
