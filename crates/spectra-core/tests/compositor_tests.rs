use spectra_core::compositor::EDIT_BACKGROUND;
use spectra_core::{
    Affine2, AudioFeed, CommandRecorder, Compositor, DrawCall, DrawState, GizmoHandle, LayerId,
    LayerStore, LayerTransform, RenderMode, Rgba, Vec2, VisualizerKind,
};
use std::collections::HashMap;

#[derive(Default)]
struct TestFeed {
    engine: Vec<u8>,
    mic: Option<Vec<u8>>,
    media: HashMap<LayerId, Vec<u8>>,
}

impl TestFeed {
    fn engine(data: Vec<u8>) -> Self {
        Self {
            engine: data,
            ..Default::default()
        }
    }
}

impl AudioFeed for TestFeed {
    fn engine_spectrum(&self) -> &[u8] {
        &self.engine
    }

    fn microphone_spectrum(&self) -> Option<&[u8]> {
        self.mic.as_deref()
    }

    fn media_spectrum(&self, layer: LayerId) -> Option<&[u8]> {
        self.media.get(&layer).map(Vec::as_slice)
    }
}

fn draw_states(calls: &[DrawCall]) -> Vec<DrawState> {
    calls
        .iter()
        .filter_map(|call| match call {
            DrawCall::Fill { state, .. } | DrawCall::Stroke { state, .. } => Some(*state),
            DrawCall::Clear(_) => None,
        })
        .collect()
}

/// Store with two bars layers: the first translated and half transparent
fn two_bar_layers() -> (LayerStore, LayerId, LayerId) {
    let mut store = LayerStore::new();
    let a = store.layers()[0].id;
    let b = store.add_layer(VisualizerKind::Bars);
    store.set_opacity(a, 0.5);
    store.set_transform(
        a,
        LayerTransform {
            translate: Vec2::new(10.0, 0.0),
            ..Default::default()
        },
    );
    (store, a, b)
}

#[test]
fn test_layer_state_never_leaks() {
    let (mut store, _, _) = two_bar_layers();
    let mut compositor = Compositor::default();
    let mut surface = CommandRecorder::new(400.0, 300.0);
    let feed = TestFeed::engine(vec![200; 16]);

    let stats = compositor.render_frame(&mut surface, &mut store, &feed);
    assert_eq!(stats.mode, RenderMode::Normal);
    assert_eq!(stats.layers_drawn, 2);
    assert_eq!(surface.depth(), 0);
    assert_eq!(surface.state(), DrawState::default());

    assert_eq!(surface.calls()[0], DrawCall::Clear(Rgba::BLACK));
    let states = draw_states(surface.calls());
    assert_eq!(states.len(), 32);

    let shifted = Affine2::from_translation(Vec2::new(10.0, 0.0));
    for state in &states[..16] {
        assert_eq!(state.alpha, 0.5);
        assert!(state.transform.abs_diff_eq(shifted, 1e-4));
    }
    for state in &states[16..] {
        assert_eq!(*state, DrawState::default());
    }
}

#[test]
fn test_hidden_and_transparent_layers_are_skipped() {
    let (mut store, a, b) = two_bar_layers();
    store.toggle_visibility(a);
    store.set_opacity(b, 0.0);
    let mut compositor = Compositor::default();
    let mut surface = CommandRecorder::new(400.0, 300.0);

    let stats = compositor.render_frame(&mut surface, &mut store, &TestFeed::engine(vec![200; 16]));
    assert_eq!(stats.layers_drawn, 0);
    assert_eq!(surface.draw_count(), 0);
}

#[test]
fn test_empty_engine_buffer_draws_nothing() {
    let mut store = LayerStore::new();
    let mut compositor = Compositor::default();
    let mut surface = CommandRecorder::new(400.0, 300.0);

    let stats = compositor.render_frame(&mut surface, &mut store, &TestFeed::default());
    assert_eq!(stats.layers_drawn, 1);
    assert_eq!(surface.draw_count(), 0);
    assert_eq!(surface.depth(), 0);
}

#[test]
fn test_microphone_reaches_selected_layers_only() {
    let (mut store, a, b) = two_bar_layers();
    store.set_opacity(a, 1.0);
    store.reset_transform(a);
    store.select_only(b);
    let feed = TestFeed {
        engine: vec![200; 8],
        mic: Some(vec![255; 4]),
        ..Default::default()
    };
    let mut compositor = Compositor::default();
    let mut surface = CommandRecorder::new(400.0, 300.0);
    compositor.render_frame(&mut surface, &mut store, &feed);

    // Layer a hears silence (zero-height bars of the engine's length),
    // layer b draws four full-height bars from the microphone
    let fills: Vec<Vec2> = surface
        .calls()
        .iter()
        .filter_map(|call| match call {
            DrawCall::Fill {
                shape: spectra_core::Shape::Rect { size, .. },
                ..
            } => Some(*size),
            _ => None,
        })
        .collect();
    assert_eq!(fills.len(), 8 + 4);
    assert!(fills[..8].iter().all(|size| size.y == 0.0));
    assert!(fills[8..].iter().all(|size| size.y == 300.0));
}

#[test]
fn test_edit_mode_previews_one_layer_with_gizmo() {
    let (mut store, _, b) = two_bar_layers();
    store.set_opacity(b, 0.25);
    store.begin_transform_edit(b);
    let mut compositor = Compositor::default();
    let mut surface = CommandRecorder::new(400.0, 300.0);

    let stats = compositor.render_frame(&mut surface, &mut store, &TestFeed::default());
    assert_eq!(stats.mode, RenderMode::Edit);
    assert_eq!(stats.layers_drawn, 1);
    assert_eq!(surface.calls()[0], DrawCall::Clear(EDIT_BACKGROUND.into()));

    // 1024 synthetic bars at full opacity, then the gizmo
    let states = draw_states(surface.calls());
    assert_eq!(states.len(), 1024 + 20);
    assert!(states.iter().all(|s| s.alpha == 1.0));
    assert_eq!(surface.depth(), 0);

    store.end_transform_edit();
    let stats = compositor.render_frame(&mut surface, &mut store, &TestFeed::default());
    assert_eq!(stats.mode, RenderMode::Normal);
}

#[test]
fn test_gizmo_drag_updates_edited_layer() {
    let (mut store, _, b) = two_bar_layers();
    let canvas = Vec2::new(400.0, 300.0);
    let mut compositor = Compositor::default();

    // No edit session, nothing to grab
    assert_eq!(compositor.pointer_down(&store, canvas, canvas * 0.5), None);

    store.begin_transform_edit(b);
    assert_eq!(
        compositor.pointer_down(&store, canvas, canvas * 0.5),
        Some(GizmoHandle::Move)
    );
    assert!(compositor.pointer_move(&mut store, canvas, canvas * 0.5 + Vec2::new(25.0, 5.0)));
    assert_eq!(store.get(b).unwrap().transform.translate, Vec2::new(25.0, 5.0));
    assert_eq!(compositor.pointer_up(), Some(GizmoHandle::Move));
    assert!(!compositor.pointer_move(&mut store, canvas, Vec2::ZERO));
}

#[test]
fn test_resize_remaps_constellation_in_place() {
    let mut store = LayerStore::new();
    let bars = store.layers()[0].id;
    store.toggle_visibility(bars);
    let id = store.add_layer(VisualizerKind::Constellation);

    let mut compositor = Compositor::default();
    let mut surface = CommandRecorder::new(400.0, 300.0);
    let feed = TestFeed::engine(vec![0; 64]);

    assert!(!compositor.render_frame(&mut surface, &mut store, &feed).resized);
    let before: Vec<Vec2> = store
        .get(id)
        .unwrap()
        .sim
        .constellation()
        .unwrap()
        .nodes()
        .iter()
        .map(|n| n.position)
        .collect();

    surface.resize(800.0, 600.0);
    assert!(compositor.render_frame(&mut surface, &mut store, &feed).resized);

    let sim = store.get(id).unwrap().sim.constellation().unwrap();
    assert_eq!(sim.len(), before.len());
    assert_eq!(sim.bounds(), Vec2::new(800.0, 600.0));
    // One step of motion on top of the doubled layout
    for (node, old) in sim.nodes().iter().zip(&before) {
        assert!((node.position - *old * 2.0).length() < 1.1);
    }
}

#[test]
fn test_empty_canvas_keeps_particle_layout() {
    let mut store = LayerStore::new();
    let bars = store.layers()[0].id;
    store.toggle_visibility(bars);
    let id = store.add_layer(VisualizerKind::Particles);

    let mut compositor = Compositor::default();
    let mut surface = CommandRecorder::new(800.0, 600.0);
    let feed = TestFeed::engine(vec![120; 64]);
    compositor.render_frame(&mut surface, &mut store, &feed);

    let positions = |store: &LayerStore| -> Vec<Vec2> {
        store
            .get(id)
            .unwrap()
            .sim
            .particles()
            .unwrap()
            .particles()
            .iter()
            .map(|p| p.position)
            .collect()
    };
    let before = positions(&store);
    assert!(!before.is_empty());

    surface.resize(0.0, 0.0);
    surface.take_calls();
    let stats = compositor.render_frame(&mut surface, &mut store, &feed);
    assert_eq!(stats.layers_drawn, 0);
    assert!(!stats.resized);
    assert_eq!(surface.draw_count(), 0);
    assert_eq!(positions(&store), before);
    assert_eq!(compositor.last_size(), Some(Vec2::new(800.0, 600.0)));

    surface.resize(800.0, 600.0);
    let stats = compositor.render_frame(&mut surface, &mut store, &feed);
    assert!(!stats.resized);
    assert_eq!(stats.layers_drawn, 1);
    let after = positions(&store);
    assert_eq!(after.len(), before.len());
    let near_origin = after.iter().filter(|p| p.length() < 2.0).count();
    assert!(near_origin < after.len() / 4);
}

#[test]
fn test_nan_state_is_rebuilt() {
    let mut store = LayerStore::new();
    let bars = store.layers()[0].id;
    store.toggle_visibility(bars);
    let id = store.add_layer(VisualizerKind::Constellation);

    let mut compositor = Compositor::default();
    let mut surface = CommandRecorder::new(400.0, 300.0);
    let feed = TestFeed::engine(vec![100; 64]);
    compositor.render_frame(&mut surface, &mut store, &feed);
    assert!(surface.draw_count() > 0);

    store
        .get_mut(id)
        .unwrap()
        .sim
        .constellation_mut()
        .unwrap()
        .nodes_mut()[0]
        .position
        .x = f32::NAN;

    surface.take_calls();
    compositor.render_frame(&mut surface, &mut store, &feed);
    assert_eq!(surface.draw_count(), 0);
    assert!(store.get(id).unwrap().sim.is_empty());

    surface.take_calls();
    compositor.render_frame(&mut surface, &mut store, &feed);
    let sim = store.get(id).unwrap().sim.constellation().unwrap();
    assert!(sim.nodes().iter().all(|n| !n.position.is_nan()));
    assert!(surface.draw_count() > 0);
}
