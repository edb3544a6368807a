//! Frequency buffers and the audio input contract
//!
//! Audio capture and analysis live outside the core. Each frame the external
//! audio layer refreshes 8-bit magnitude buffers (`FFT size / 2` bins) and
//! exposes them through [`AudioFeed`]; the compositor only reads them.

use crate::layer::LayerId;

/// Default analyser FFT size
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Number of low bins averaged for the bass energy estimate
pub const BASS_BINS: usize = 20;

/// Exponent applied to raw bass energy to lift quiet passages
pub const ENERGY_CURVE: f32 = 0.7;

/// Per-frame source of frequency-domain data
pub trait AudioFeed {
    /// The global engine buffer (file playback / test tone). May be empty.
    fn engine_spectrum(&self) -> &[u8];

    /// The live microphone buffer, `Some` only while the microphone is active
    fn microphone_spectrum(&self) -> Option<&[u8]>;

    /// The buffer of the media bound to `layer`, `None` if nothing is bound
    /// or the media is not decoded yet
    fn media_spectrum(&self, layer: LayerId) -> Option<&[u8]>;
}

/// FFT size for a detail level (1..=6 maps to 512..=16384)
pub fn fft_size_for_detail(level: u8) -> usize {
    1usize << (8 + level.clamp(1, 6) as u32)
}

/// A reusable magnitude buffer sized from an FFT size
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumBuffer {
    fft_size: usize,
    data: Vec<u8>,
}

impl Default for SpectrumBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_FFT_SIZE)
    }
}

impl SpectrumBuffer {
    /// Create a zeroed buffer of `fft_size / 2` bins
    pub fn new(fft_size: usize) -> Self {
        Self {
            fft_size,
            data: vec![0; fft_size / 2],
        }
    }

    /// Create a buffer for a detail level
    pub fn with_detail(level: u8) -> Self {
        Self::new(fft_size_for_detail(level))
    }

    /// Change the detail level; reallocates and returns true if the size changed
    pub fn set_detail(&mut self, level: u8) -> bool {
        let fft_size = fft_size_for_detail(level);
        if fft_size == self.fft_size {
            return false;
        }
        *self = Self::new(fft_size);
        true
    }

    /// Analyser FFT size
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there are no bins
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only view
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Writable view for the producer
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero every bin
    pub fn silence(&mut self) {
        self.data.fill(0);
    }
}

/// Mean of the first [`BASS_BINS`] bins, normalized to `[0, 1]`
pub fn bass_energy(data: &[u8]) -> f32 {
    let bins = data.len().min(BASS_BINS);
    if bins == 0 {
        return 0.0;
    }
    let sum: u32 = data[..bins].iter().map(|&v| v as u32).sum();
    sum as f32 / bins as f32 / 255.0
}

/// Bass energy shaped by [`ENERGY_CURVE`] and scaled by `intensity`
pub fn pulse_energy(data: &[u8], intensity: f32) -> f32 {
    bass_energy(data).powf(ENERGY_CURVE) * intensity
}

/// Mean of every bin, normalized to `[0, 1]`
pub fn mean_level(data: &[u8]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: u64 = data.iter().map(|&v| v as u64).sum();
    sum as f32 / data.len() as f32 / 255.0
}

/// Fill `out` with a linearly decaying spectrum (edit-mode preview data)
pub fn synthetic_decay(out: &mut [u8]) {
    let len = out.len().max(1) as f32;
    for (i, value) in out.iter_mut().enumerate() {
        *value = (255.0 * (1.0 - i as f32 / len)).floor() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_levels() {
        assert_eq!(fft_size_for_detail(1), 512);
        assert_eq!(fft_size_for_detail(3), 2048);
        assert_eq!(fft_size_for_detail(6), 16384);
        assert_eq!(fft_size_for_detail(0), 512);
        assert_eq!(fft_size_for_detail(99), 16384);
    }

    #[test]
    fn test_set_detail_reallocates() {
        let mut buffer = SpectrumBuffer::default();
        assert_eq!(buffer.len(), 1024);
        assert!(!buffer.set_detail(3));
        assert!(buffer.set_detail(1));
        assert_eq!(buffer.len(), 256);
        assert_eq!(buffer.fft_size(), 512);
    }

    #[test]
    fn test_energy_helpers() {
        assert_eq!(bass_energy(&[]), 0.0);
        assert_eq!(bass_energy(&[255; 40]), 1.0);
        // Only the first 20 bins count
        let mut data = vec![0u8; 40];
        data[20..].fill(255);
        assert_eq!(bass_energy(&data), 0.0);

        assert_eq!(pulse_energy(&[255; 4], 2.0), 2.0);
        assert_eq!(mean_level(&[0, 255]), 0.5);
        assert_eq!(mean_level(&[]), 0.0);
    }

    #[test]
    fn test_synthetic_decay() {
        let mut data = vec![0u8; 4];
        synthetic_decay(&mut data);
        assert_eq!(data, vec![255, 191, 127, 63]);
    }
}
