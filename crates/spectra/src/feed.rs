//! Synthetic audio for headless rendering
//!
//! Stands in for the audio engine: a slowly breathing, high-end-decaying
//! spectrum with a bass kick every half second. Layers with bound media get
//! their own phase-shifted copy, and the simulated microphone is a separate
//! rippling curve.

use spectra_core::{AudioFeed, LayerId, LayerStore, SpectrumBuffer};
use std::collections::HashMap;
use std::f32::consts::TAU;

/// Bass kicks per second
const KICK_RATE: f32 = 2.0;

/// Bins boosted by a kick
const KICK_BINS: usize = 20;

/// Time-driven spectra for the engine, microphone and bound media
#[derive(Debug, Clone)]
pub struct SyntheticFeed {
    engine: SpectrumBuffer,
    microphone: Option<SpectrumBuffer>,
    media: HashMap<LayerId, SpectrumBuffer>,
}

fn kick(time: f32) -> f32 {
    let phase = (time * KICK_RATE).fract();
    (-phase * 6.0).exp()
}

fn fill_music(out: &mut [u8], time: f32) {
    let len = out.len().max(1) as f32;
    let kick = kick(time);
    for (i, value) in out.iter_mut().enumerate() {
        let x = i as f32 / len;
        let breathe = 0.6 + 0.4 * (time * 1.3 + x * 8.0).sin();
        let mut level = 255.0 * (1.0 - x).powi(2) * breathe;
        if i < KICK_BINS {
            level += 255.0 * kick * (1.0 - i as f32 / KICK_BINS as f32);
        }
        *value = level.clamp(0.0, 255.0) as u8;
    }
}

fn fill_microphone(out: &mut [u8], time: f32) {
    let len = out.len().max(1) as f32;
    for (i, value) in out.iter_mut().enumerate() {
        let x = i as f32 / len;
        let ripple = 0.5 + 0.5 * (time * 3.0 + i as f32 * 0.2).sin();
        *value = (255.0 * ripple * (1.0 - x)).clamp(0.0, 255.0) as u8;
    }
}

impl SyntheticFeed {
    /// Create a feed at FFT detail `level`, optionally with a microphone
    pub fn new(level: u8, microphone: bool) -> Self {
        Self {
            engine: SpectrumBuffer::with_detail(level),
            microphone: microphone.then(|| SpectrumBuffer::with_detail(level)),
            media: HashMap::new(),
        }
    }

    /// Number of bins per buffer
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    /// Recompute every buffer for `time` seconds. Media buffers follow the
    /// store's bindings: new bindings get a buffer, removed ones are dropped.
    pub fn advance(&mut self, time: f32, store: &LayerStore) {
        fill_music(self.engine.as_mut_slice(), time);
        if let Some(mic) = &mut self.microphone {
            fill_microphone(mic.as_mut_slice(), time);
        }

        let fft_size = self.engine.fft_size();
        self.media
            .retain(|id, _| store.get(*id).is_some_and(|l| l.media.is_some()));
        for layer in store.layers().iter().filter(|l| l.media.is_some()) {
            let buffer = self
                .media
                .entry(layer.id)
                .or_insert_with(|| SpectrumBuffer::new(fft_size));
            let offset = (layer.id.0 % 7) as f32 / 7.0 * TAU;
            fill_music(buffer.as_mut_slice(), time + offset);
        }
    }
}

impl AudioFeed for SyntheticFeed {
    fn engine_spectrum(&self) -> &[u8] {
        self.engine.as_slice()
    }

    fn microphone_spectrum(&self) -> Option<&[u8]> {
        self.microphone.as_ref().map(SpectrumBuffer::as_slice)
    }

    fn media_spectrum(&self, layer: LayerId) -> Option<&[u8]> {
        self.media.get(&layer).map(SpectrumBuffer::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectra_core::VisualizerKind;

    #[test]
    fn test_kick_decays_within_a_beat() {
        assert!((kick(0.0) - 1.0).abs() < 1e-6);
        assert!(kick(0.4) < 0.1);
        assert!((kick(0.5) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_engine_is_bass_heavy() {
        let mut feed = SyntheticFeed::new(3, false);
        feed.advance(0.0, &LayerStore::new());
        let data = feed.engine_spectrum();
        assert_eq!(data.len(), 1024);
        assert_eq!(data[0], 255);
        assert!(data[900] < data[10]);
        assert!(feed.microphone_spectrum().is_none());
    }

    #[test]
    fn test_media_follows_bindings() {
        let mut store = LayerStore::new();
        let id = store.add_layer(VisualizerKind::Bars);
        let mut feed = SyntheticFeed::new(1, true);

        feed.advance(0.1, &store);
        assert!(feed.media_spectrum(id).is_none());

        store.assign_media(id, "loop.wav");
        feed.advance(0.2, &store);
        assert_eq!(feed.media_spectrum(id).map(<[u8]>::len), Some(256));

        store.clear_media(id);
        feed.advance(0.3, &store);
        assert!(feed.media_spectrum(id).is_none());
        assert_eq!(feed.microphone_spectrum().map(<[u8]>::len), Some(256));
    }
}
