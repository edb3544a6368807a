//! Per-layer cache for canvas gradient objects
//!
//! A cached gradient is keyed by the color mode, the flattened stop list and
//! the gradient geometry. Any stop mutation, mode change or canvas resize
//! changes the key, so a stale gradient can never be handed out. Explicit
//! [`GradientCache::invalidate`] is still called by the layer store and the
//! resize rescaler to drop the allocation eagerly.

use crate::color::{ColorConfig, ColorMode, Rgb};
use crate::surface::{Gradient, GradientKind};
use std::sync::Arc;
use tracing::trace;

/// Identity of a cached gradient
#[derive(Debug, Clone, PartialEq)]
pub struct GradientKey {
    mode: ColorMode,
    stops: Vec<(f32, Rgb)>,
    kind: GradientKind,
}

impl GradientKey {
    /// Key for `config` rendered with geometry `kind`
    pub fn new(config: &ColorConfig, kind: GradientKind) -> Self {
        Self {
            mode: config.mode,
            stops: config.gradient_stops(),
            kind,
        }
    }

    fn build(&self) -> Gradient {
        Gradient::new(self.kind, self.stops.iter().copied())
    }
}

/// Single-entry gradient cache
#[derive(Debug, Clone, Default)]
pub struct GradientCache {
    entry: Option<(GradientKey, Arc<Gradient>)>,
    builds: u64,
}

impl GradientCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached gradient for `config`/`kind`, rebuilding on a key miss
    pub fn resolve(&mut self, config: &ColorConfig, kind: GradientKind) -> Arc<Gradient> {
        let key = GradientKey::new(config, kind);
        if let Some((cached_key, gradient)) = &self.entry {
            if *cached_key == key {
                return Arc::clone(gradient);
            }
        }

        trace!(builds = self.builds + 1, "Rebuilding gradient");
        let gradient = Arc::new(key.build());
        self.builds += 1;
        self.entry = Some((key, Arc::clone(&gradient)));
        gradient
    }

    /// Drop the cached gradient
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Whether a gradient is cached
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// How many gradients have been built by this cache
    pub fn builds(&self) -> u64 {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorStop;
    use glam::Vec2;

    fn horizontal(width: f32) -> GradientKind {
        GradientKind::Linear {
            start: Vec2::ZERO,
            end: Vec2::new(width, 0.0),
        }
    }

    #[test]
    fn test_cache_hit_reuses_allocation() {
        let config = ColorConfig::default();
        let mut cache = GradientCache::new();
        let a = cache.resolve(&config, horizontal(100.0));
        let b = cache.resolve(&config, horizontal(100.0));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.builds(), 1);
    }

    #[test]
    fn test_cache_misses_on_stop_mutation_and_resize() {
        let mut config = ColorConfig::default();
        let mut cache = GradientCache::new();
        let before = cache.resolve(&config, horizontal(100.0));

        config.stops.set_color(0, Rgb::new(1, 2, 3));
        let after = cache.resolve(&config, horizontal(100.0));
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.stops[0].color, Rgb::new(1, 2, 3));

        let resized = cache.resolve(&config, horizontal(200.0));
        assert_eq!(resized.kind, horizontal(200.0));
        assert_eq!(cache.builds(), 3);
    }

    #[test]
    fn test_cache_misses_on_mode_change() {
        let mut config = ColorConfig::gradient(vec![
            ColorStop::new(0.0, Rgb::BLACK),
            ColorStop::new(100.0, Rgb::WHITE),
        ]);
        let mut cache = GradientCache::new();
        cache.resolve(&config, horizontal(10.0));
        config.mode = ColorMode::MultiGradient;
        let multi = cache.resolve(&config, horizontal(10.0));
        assert!(multi.stops.is_empty());
    }

    #[test]
    fn test_invalidate() {
        let mut cache = GradientCache::new();
        cache.resolve(&ColorConfig::default(), horizontal(10.0));
        assert!(!cache.is_empty());
        cache.invalidate();
        assert!(cache.is_empty());
    }
}
