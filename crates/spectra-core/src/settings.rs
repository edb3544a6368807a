//! Visualizer kinds and their per-layer settings records
//!
//! Each kind has its own settings sub-record. A layer only carries the
//! records that were explicitly set; readers fall back to defaults, and
//! every value is sanitized before use so zero, negative or NaN settings
//! behave like missing ones.

use serde::{Deserialize, Serialize};

/// Which visual algorithm a layer runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizerKind {
    /// Vertical spectrum bars
    #[default]
    Bars,
    /// Mirrored radial spectrum
    Circle,
    /// Full 360° radial spectrum
    CircleLinear,
    /// Drifting, pulsing particles
    Particles,
    /// Proximity-graph mesh
    Constellation,
    /// Infinite deterministic triangle mesh
    CrystalWall,
    /// Full-screen flash
    Flash,
}

impl VisualizerKind {
    /// List all visualizer kinds
    pub fn all() -> &'static [VisualizerKind] {
        &[
            VisualizerKind::Bars,
            VisualizerKind::Circle,
            VisualizerKind::CircleLinear,
            VisualizerKind::Particles,
            VisualizerKind::Constellation,
            VisualizerKind::CrystalWall,
            VisualizerKind::Flash,
        ]
    }

    /// Stable tag used in scene files and logs
    pub fn tag(&self) -> &'static str {
        match self {
            VisualizerKind::Bars => "bars",
            VisualizerKind::Circle => "circle",
            VisualizerKind::CircleLinear => "circle-linear",
            VisualizerKind::Particles => "particles",
            VisualizerKind::Constellation => "constellation",
            VisualizerKind::CrystalWall => "crystal-wall",
            VisualizerKind::Flash => "flash",
        }
    }

    /// Whether the kind keeps simulation state between frames
    pub fn is_stateful(&self) -> bool {
        matches!(
            self,
            VisualizerKind::Particles | VisualizerKind::Constellation | VisualizerKind::CrystalWall
        )
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn count_or(value: usize, fallback: usize) -> usize {
    if value == 0 {
        fallback
    } else {
        value
    }
}

/// Smallest allowed bar width, as a fraction of the bar's slot
pub const MIN_BAR_WIDTH_MULTIPLIER: f32 = 0.05;

/// Settings for [`VisualizerKind::Bars`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarsSettings {
    /// Drawn bar width relative to its slot
    pub bar_width_multiplier: f32,
    /// Height multiplier
    pub intensity: f32,
}

impl Default for BarsSettings {
    fn default() -> Self {
        Self {
            bar_width_multiplier: 0.8,
            intensity: 1.0,
        }
    }
}

impl BarsSettings {
    /// Copy with invalid values replaced and the width clamped
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            bar_width_multiplier: positive_or(self.bar_width_multiplier, d.bar_width_multiplier)
                .max(MIN_BAR_WIDTH_MULTIPLIER),
            intensity: positive_or(self.intensity, d.intensity),
        }
    }
}

/// Settings for [`VisualizerKind::Circle`] and [`VisualizerKind::CircleLinear`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleSettings {
    /// Base circle radius in pixels
    pub radius: f32,
    /// Line length multiplier
    pub intensity: f32,
}

impl Default for CircleSettings {
    fn default() -> Self {
        Self {
            radius: 150.0,
            intensity: 1.0,
        }
    }
}

impl CircleSettings {
    /// Copy with invalid values replaced
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            radius: positive_or(self.radius, d.radius),
            intensity: positive_or(self.intensity, d.intensity),
        }
    }
}

/// Settings for [`VisualizerKind::Particles`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    /// Number of particles
    pub particle_count: usize,
    /// Upper bound of the random base radius (plus one pixel)
    pub base_size: f32,
    /// Motion and pulse multiplier
    pub intensity: f32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            particle_count: 150,
            base_size: 3.0,
            intensity: 1.0,
        }
    }
}

impl ParticleSettings {
    /// Copy with invalid values replaced
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            particle_count: count_or(self.particle_count, d.particle_count),
            base_size: positive_or(self.base_size, d.base_size),
            intensity: positive_or(self.intensity, d.intensity),
        }
    }
}

/// Settings for [`VisualizerKind::Constellation`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstellationSettings {
    /// Number of nodes
    pub node_count: usize,
    /// Maximum edge length in pixels
    pub connect_distance: f32,
    /// Initial velocity scale
    pub speed: f32,
    /// How strongly bass energy pulses speed, size and edge opacity
    pub pulse_strength: f32,
    /// Node radius multiplier
    pub base_size: f32,
    /// Edge stroke width
    pub line_weight: f32,
    /// Energy multiplier
    pub intensity: f32,
    /// Per-frame motion multiplier
    pub node_speed: f32,
}

impl Default for ConstellationSettings {
    fn default() -> Self {
        Self {
            node_count: 80,
            connect_distance: 150.0,
            speed: 1.0,
            pulse_strength: 0.8,
            base_size: 2.0,
            line_weight: 1.0,
            intensity: 1.0,
            node_speed: 1.0,
        }
    }
}

impl ConstellationSettings {
    /// Copy with invalid values replaced
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            node_count: count_or(self.node_count, d.node_count),
            connect_distance: positive_or(self.connect_distance, d.connect_distance),
            speed: positive_or(self.speed, d.speed),
            pulse_strength: positive_or(self.pulse_strength, d.pulse_strength),
            base_size: positive_or(self.base_size, d.base_size),
            line_weight: positive_or(self.line_weight, d.line_weight),
            intensity: positive_or(self.intensity, d.intensity),
            node_speed: positive_or(self.node_speed, d.node_speed),
        }
    }
}

/// Settings for [`VisualizerKind::CrystalWall`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrystalWallSettings {
    /// Approximate number of grid anchors covering the canvas
    pub node_count: usize,
    /// Camera drift speed (also shortens the retarget interval)
    pub anchor_speed: f32,
    /// Local orbital jitter speed
    pub node_speed: f32,
    /// How strongly bass energy widens the jitter orbits
    pub pulse_strength: f32,
    /// Energy multiplier
    pub intensity: f32,
}

impl Default for CrystalWallSettings {
    fn default() -> Self {
        Self {
            node_count: 50,
            anchor_speed: 1.0,
            node_speed: 1.0,
            pulse_strength: 0.8,
            intensity: 1.0,
        }
    }
}

impl CrystalWallSettings {
    /// Copy with invalid values replaced
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        Self {
            node_count: count_or(self.node_count, d.node_count),
            anchor_speed: positive_or(self.anchor_speed, d.anchor_speed),
            node_speed: positive_or(self.node_speed, d.node_speed),
            pulse_strength: positive_or(self.pulse_strength, d.pulse_strength),
            intensity: positive_or(self.intensity, d.intensity),
        }
    }
}

/// Settings for [`VisualizerKind::Flash`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashSettings {
    /// Mean level below which nothing is drawn
    pub threshold: f32,
}

impl Default for FlashSettings {
    fn default() -> Self {
        Self { threshold: 0.1 }
    }
}

impl FlashSettings {
    /// Copy with invalid values replaced; a zero threshold is allowed
    pub fn sanitized(&self) -> Self {
        let threshold = if self.threshold.is_finite() {
            self.threshold.clamp(0.0, 1.0)
        } else {
            Self::default().threshold
        };
        Self { threshold }
    }
}

/// All settings sub-records of a layer. Unset records read as defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizSettings {
    /// Bars settings
    pub bars: Option<BarsSettings>,
    /// Circle settings
    pub circle: Option<CircleSettings>,
    /// Circle-linear settings
    pub circle_linear: Option<CircleSettings>,
    /// Particle settings
    pub particles: Option<ParticleSettings>,
    /// Constellation settings
    pub constellation: Option<ConstellationSettings>,
    /// Crystal wall settings
    pub crystal_wall: Option<CrystalWallSettings>,
    /// Flash settings
    pub flash: Option<FlashSettings>,
}

impl VizSettings {
    /// Effective bars settings
    pub fn bars(&self) -> BarsSettings {
        self.bars.unwrap_or_default().sanitized()
    }

    /// Effective circle settings
    pub fn circle(&self) -> CircleSettings {
        self.circle.unwrap_or_default().sanitized()
    }

    /// Effective circle-linear settings
    pub fn circle_linear(&self) -> CircleSettings {
        self.circle_linear.unwrap_or_default().sanitized()
    }

    /// Effective particle settings
    pub fn particles(&self) -> ParticleSettings {
        self.particles.unwrap_or_default().sanitized()
    }

    /// Effective constellation settings
    pub fn constellation(&self) -> ConstellationSettings {
        self.constellation.unwrap_or_default().sanitized()
    }

    /// Effective crystal wall settings
    pub fn crystal_wall(&self) -> CrystalWallSettings {
        self.crystal_wall.unwrap_or_default().sanitized()
    }

    /// Effective flash settings
    pub fn flash(&self) -> FlashSettings {
        self.flash.unwrap_or_default().sanitized()
    }

    /// Bars record, created with defaults if missing
    pub fn bars_mut(&mut self) -> &mut BarsSettings {
        self.bars.get_or_insert_with(Default::default)
    }

    /// Circle record, created with defaults if missing
    pub fn circle_mut(&mut self) -> &mut CircleSettings {
        self.circle.get_or_insert_with(Default::default)
    }

    /// Circle-linear record, created with defaults if missing
    pub fn circle_linear_mut(&mut self) -> &mut CircleSettings {
        self.circle_linear.get_or_insert_with(Default::default)
    }

    /// Particle record, created with defaults if missing
    pub fn particles_mut(&mut self) -> &mut ParticleSettings {
        self.particles.get_or_insert_with(Default::default)
    }

    /// Constellation record, created with defaults if missing
    pub fn constellation_mut(&mut self) -> &mut ConstellationSettings {
        self.constellation.get_or_insert_with(Default::default)
    }

    /// Crystal wall record, created with defaults if missing
    pub fn crystal_wall_mut(&mut self) -> &mut CrystalWallSettings {
        self.crystal_wall.get_or_insert_with(Default::default)
    }

    /// Flash record, created with defaults if missing
    pub fn flash_mut(&mut self) -> &mut FlashSettings {
        self.flash.get_or_insert_with(Default::default)
    }

    /// Set the intensity of `kind`'s record; returns false for kinds without one
    pub fn set_intensity(&mut self, kind: VisualizerKind, intensity: f32) -> bool {
        match kind {
            VisualizerKind::Bars => self.bars_mut().intensity = intensity,
            VisualizerKind::Circle => self.circle_mut().intensity = intensity,
            VisualizerKind::CircleLinear => self.circle_linear_mut().intensity = intensity,
            VisualizerKind::Particles => self.particles_mut().intensity = intensity,
            VisualizerKind::Constellation => self.constellation_mut().intensity = intensity,
            VisualizerKind::CrystalWall => self.crystal_wall_mut().intensity = intensity,
            VisualizerKind::Flash => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_records_read_as_defaults() {
        let settings = VizSettings::default();
        assert_eq!(settings.particles(), ParticleSettings::default());
        assert_eq!(settings.constellation().node_count, 80);
        assert_eq!(settings.crystal_wall().node_count, 50);
        assert_eq!(settings.circle().radius, 150.0);
        assert!(settings.particles.is_none());
    }

    #[test]
    fn test_sanitize_replaces_invalid_values() {
        let mut settings = VizSettings::default();
        settings.particles_mut().particle_count = 0;
        settings.particles_mut().intensity = f32::NAN;
        settings.bars_mut().bar_width_multiplier = 0.001;
        settings.flash_mut().threshold = 0.0;

        assert_eq!(settings.particles().particle_count, 150);
        assert_eq!(settings.particles().intensity, 1.0);
        assert_eq!(settings.bars().bar_width_multiplier, MIN_BAR_WIDTH_MULTIPLIER);
        assert_eq!(settings.flash().threshold, 0.0);
    }

    #[test]
    fn test_set_intensity_creates_record() {
        let mut settings = VizSettings::default();
        assert!(settings.set_intensity(VisualizerKind::Constellation, 2.0));
        assert_eq!(settings.constellation().intensity, 2.0);
        assert!(!settings.set_intensity(VisualizerKind::Flash, 2.0));
    }

    #[test]
    fn test_kind_tags_roundtrip_through_serde() {
        for kind in VisualizerKind::all() {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.tag()));
        }
    }
}
