//! Property tests for color resolution and the gradient cache.

use proptest::prelude::*;
use spectra_core::color::color_from_stops;
use spectra_core::{
    ColorConfig, ColorStop, Gradient, GradientCache, GradientKind, GradientSegment, Rgb,
    StopList, Vec2,
};

fn rgb() -> impl Strategy<Value = Rgb> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
}

fn stop() -> impl Strategy<Value = ColorStop> {
    (-20.0f32..120.0, rgb()).prop_map(|(offset, color)| ColorStop::new(offset, color))
}

fn segment() -> impl Strategy<Value = GradientSegment> {
    (0.0f32..100.0, 0.0f32..100.0, prop::collection::vec(stop(), 0..4))
        .prop_map(|(a, b, stops)| GradientSegment::new(a.min(b), a.max(b), stops))
}

fn config() -> impl Strategy<Value = ColorConfig> {
    prop_oneof![
        rgb().prop_map(ColorConfig::single),
        prop::collection::vec(stop(), 0..6).prop_map(ColorConfig::gradient),
        prop::collection::vec(segment(), 0..4).prop_map(ColorConfig::multi_gradient),
    ]
}

fn kind() -> impl Strategy<Value = GradientKind> {
    prop_oneof![
        (0.0f32..800.0, 0.0f32..800.0).prop_map(|(w, h)| GradientKind::Linear {
            start: Vec2::ZERO,
            end: Vec2::new(w, h),
        }),
        (0.0f32..400.0, 1.0f32..400.0).prop_map(|(c, r)| GradientKind::Conic {
            center: Vec2::splat(c),
            start_angle: -r.to_radians(),
        }),
    ]
}

proptest! {
    #[test]
    fn sorted_stops_are_ordered_and_complete(stops in prop::collection::vec(stop(), 0..12)) {
        let list = StopList::new(stops.clone());
        let sorted = list.sorted();
        prop_assert_eq!(sorted.len(), stops.len());
        prop_assert!(sorted.windows(2).all(|w| w[0].offset <= w[1].offset));
        prop_assert!(sorted.iter().all(|s| (0.0..=100.0).contains(&s.offset)));
        // Insertion order is untouched
        prop_assert_eq!(list.stops(), stops.as_slice());
    }

    #[test]
    fn color_at_is_total(config in config(), t in prop::num::f32::ANY) {
        // Must not panic for any t, including NaN and infinities
        let _ = config.color_at(t);
    }

    #[test]
    fn gradient_clamps_outside_stop_range(stops in prop::collection::vec(stop(), 1..6), t in 1.0f32..5.0) {
        let config = ColorConfig::gradient(stops);
        let sorted = config.stops.sorted();
        prop_assert_eq!(config.color_at(-t), sorted[0].color);
        prop_assert_eq!(config.color_at(t), sorted[sorted.len() - 1].color);
    }

    #[test]
    fn single_mode_ignores_t(color in rgb(), t in -2.0f32..2.0) {
        let config = ColorConfig::single(color);
        prop_assert_eq!(config.color_at(t), color);
    }

    #[test]
    fn cached_gradient_matches_fresh_build(
        configs in prop::collection::vec(config(), 1..6),
        kinds in prop::collection::vec(kind(), 1..6),
    ) {
        let mut cache = GradientCache::new();
        for (config, kind) in configs.iter().cycle().zip(kinds.iter()) {
            let cached = cache.resolve(config, *kind);
            let fresh = Gradient::new(*kind, config.gradient_stops());
            prop_assert_eq!(&*cached, &fresh);
        }
    }

    #[test]
    fn stop_mutation_never_serves_stale_gradient(
        stops in prop::collection::vec(stop(), 2..6),
        color in rgb(),
    ) {
        let kind = GradientKind::Linear { start: Vec2::ZERO, end: Vec2::new(100.0, 0.0) };
        let mut config = ColorConfig::gradient(stops);
        let mut cache = GradientCache::new();
        let _ = cache.resolve(&config, kind);

        config.stops.set_color(0, color);
        let cached = cache.resolve(&config, kind);
        prop_assert_eq!(&*cached, &Gradient::new(kind, config.gradient_stops()));
    }

    #[test]
    fn interpolation_stays_between_neighbours(a in rgb(), b in rgb(), t in 0.0f32..=1.0) {
        let stops = [ColorStop::new(0.0, a), ColorStop::new(100.0, b)];
        let c = color_from_stops(&stops, t);
        for (x, lo, hi) in [(c.r, a.r, b.r), (c.g, a.g, b.g), (c.b, a.b, b.b)] {
            prop_assert!(x >= lo.min(hi) && x <= lo.max(hi));
        }
    }
}
