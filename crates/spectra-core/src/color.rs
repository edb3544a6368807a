//! Color configuration and resolution
//!
//! A [`ColorConfig`] maps a scalar `t ∈ [0, 1]` to a concrete color using one
//! of three models: a single color, a gradient over sorted stops, or several
//! ranged gradients blended by proximity.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width (in offset percentage points) over which a multi-gradient segment's
/// influence tapers from 1 to 0 outside its range.
pub const SEGMENT_BLEND_MARGIN: f32 = 5.0;

/// An opaque 8-bit RGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Pure white, the fallback for empty stop lists
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// Pure black, the result when no multi-gradient segment has influence
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a color from channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb` or the short `#rgb` form
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        let digits = hex.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(CoreError::InvalidColor(hex.to_string())),
        };
        let value = u32::from_str_radix(&expanded, 16)
            .map_err(|_| CoreError::InvalidColor(hex.to_string()))?;
        Ok(Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        })
    }

    /// Format as lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Attach an alpha value
    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba::new(self.r, self.g, self.b, alpha)
    }

    /// Per-channel linear interpolation, floored
    pub fn lerp_floor(a: Rgb, b: Rgb, t: f32) -> Rgb {
        let channel = |x: u8, y: u8| {
            let x = x as f32;
            (x + (y as f32 - x) * t).floor() as u8
        };
        Rgb::new(channel(a.r, b.r), channel(a.g, b.g), channel(a.b, b.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// An RGB color with a floating point alpha in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha, clamped to `[0, 1]`
    pub a: f32,
}

impl Rgba {
    /// Opaque black
    pub const BLACK: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 1.0,
    };

    /// Create a color; alpha is clamped and NaN becomes 0
    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        let a = if a.is_nan() { 0.0 } else { a.clamp(0.0, 1.0) };
        Self { r, g, b, a }
    }

    /// Drop the alpha channel
    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    /// Multiply alpha by `factor`
    pub fn fade(self, factor: f32) -> Self {
        Self::new(self.r, self.g, self.b, self.a * factor)
    }
}

impl From<Rgb> for Rgba {
    fn from(value: Rgb) -> Self {
        value.with_alpha(1.0)
    }
}

/// A gradient control point; offset is in percent (`0..=100`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient in percent
    pub offset: f32,
    /// Color at this position
    pub color: Rgb,
}

impl ColorStop {
    /// Create a stop, clamping the offset into `0..=100` (NaN becomes 0)
    pub fn new(offset: f32, color: Rgb) -> Self {
        Self {
            offset: sanitize_offset(offset),
            color,
        }
    }
}

fn sanitize_offset(offset: f32) -> f32 {
    if offset.is_finite() {
        offset.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Stop list that keeps a cached copy sorted by offset.
///
/// The sorted copy is recomputed on every mutation; the sort is stable so
/// stops sharing an offset keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ColorStop>", into = "Vec<ColorStop>")]
pub struct StopList {
    stops: Vec<ColorStop>,
    sorted: Vec<ColorStop>,
}

impl StopList {
    /// Create from stops in insertion order
    pub fn new(stops: Vec<ColorStop>) -> Self {
        let mut list = Self {
            stops,
            sorted: Vec::new(),
        };
        for stop in &mut list.stops {
            stop.offset = sanitize_offset(stop.offset);
        }
        list.resort();
        list
    }

    fn resort(&mut self) {
        self.sorted.clone_from(&self.stops);
        self.sorted.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    }

    /// Stops in insertion order
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Stops sorted ascending by offset
    pub fn sorted(&self) -> &[ColorStop] {
        &self.sorted
    }

    /// Number of stops
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Append a stop
    pub fn push(&mut self, stop: ColorStop) {
        self.stops.push(ColorStop::new(stop.offset, stop.color));
        self.resort();
    }

    /// Move the stop at `index`; returns false if out of range
    pub fn set_offset(&mut self, index: usize, offset: f32) -> bool {
        match self.stops.get_mut(index) {
            Some(stop) => {
                stop.offset = sanitize_offset(offset);
                self.resort();
                true
            }
            None => false,
        }
    }

    /// Recolor the stop at `index`; returns false if out of range
    pub fn set_color(&mut self, index: usize, color: Rgb) -> bool {
        match self.stops.get_mut(index) {
            Some(stop) => {
                stop.color = color;
                self.resort();
                true
            }
            None => false,
        }
    }

    /// Remove the stop at `index`
    pub fn remove(&mut self, index: usize) -> Option<ColorStop> {
        if index >= self.stops.len() {
            return None;
        }
        let removed = self.stops.remove(index);
        self.resort();
        Some(removed)
    }

    /// Replace every stop
    pub fn replace(&mut self, stops: Vec<ColorStop>) {
        *self = Self::new(stops);
    }
}

impl From<Vec<ColorStop>> for StopList {
    fn from(stops: Vec<ColorStop>) -> Self {
        Self::new(stops)
    }
}

impl From<StopList> for Vec<ColorStop> {
    fn from(list: StopList) -> Self {
        list.stops
    }
}

/// Color model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    /// One flat color (the first sorted stop)
    Single,
    /// Linear interpolation across sorted stops
    #[default]
    Gradient,
    /// Several ranged gradients blended by proximity
    MultiGradient,
}

/// What drives the color position `t`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ColorSource {
    /// Position of the bin/node/particle, normalized to `[0, 1]`
    #[default]
    Frequency,
    /// Instantaneous normalized magnitude
    Volume,
}

impl ColorSource {
    /// Pick the color position for this source
    pub fn select(self, position: f32, amplitude: f32) -> f32 {
        match self {
            ColorSource::Frequency => position,
            ColorSource::Volume => amplitude,
        }
    }
}

/// One ranged gradient of a multi-gradient configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientSegment {
    /// Range start in percent
    pub start: f32,
    /// Range end in percent
    pub end: f32,
    /// The segment's own stops, offsets relative to the segment
    pub stops: StopList,
}

impl GradientSegment {
    /// Create a segment covering `start..=end`
    pub fn new(start: f32, end: f32, stops: Vec<ColorStop>) -> Self {
        Self {
            start: sanitize_offset(start),
            end: sanitize_offset(end),
            stops: StopList::new(stops),
        }
    }

    fn bounds(&self) -> (f32, f32) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    /// Influence weight at `percent`: 1 inside the range, tapering to 0
    /// over [`SEGMENT_BLEND_MARGIN`] outside it
    pub fn influence(&self, percent: f32) -> f32 {
        let (lo, hi) = self.bounds();
        let distance = if percent < lo {
            lo - percent
        } else if percent > hi {
            percent - hi
        } else {
            return 1.0;
        };
        (1.0 - distance / SEGMENT_BLEND_MARGIN).max(0.0)
    }

    /// Evaluate this segment's gradient at a global `percent`
    pub fn color_at_percent(&self, percent: f32) -> Rgb {
        let (lo, hi) = self.bounds();
        let span = hi - lo;
        let local = if span <= 0.0 {
            0.0
        } else {
            ((percent - lo) / span).clamp(0.0, 1.0)
        };
        color_from_stops(self.stops.sorted(), local)
    }

    /// Stops mapped into the global `0..=100` range
    fn master_stops(&self) -> impl Iterator<Item = ColorStop> + '_ {
        self.stops.sorted().iter().map(move |stop| {
            ColorStop::new(
                self.start + (stop.offset / 100.0) * (self.end - self.start),
                stop.color,
            )
        })
    }
}

/// Per-layer (or process-wide default) color configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Color model
    pub mode: ColorMode,
    /// What drives `t`
    pub source: ColorSource,
    /// Stops for single and gradient modes
    pub stops: StopList,
    /// Segments for multi-gradient mode
    pub segments: Vec<GradientSegment>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            mode: ColorMode::Gradient,
            source: ColorSource::Frequency,
            stops: StopList::new(vec![
                ColorStop::new(0.0, Rgb::new(0x00, 0xff, 0xff)),
                ColorStop::new(100.0, Rgb::new(0xff, 0x00, 0xff)),
            ]),
            segments: Vec::new(),
        }
    }
}

impl ColorConfig {
    /// Single-color configuration
    pub fn single(color: Rgb) -> Self {
        Self {
            mode: ColorMode::Single,
            stops: StopList::new(vec![ColorStop::new(0.0, color)]),
            ..Default::default()
        }
    }

    /// Gradient configuration over `stops`
    pub fn gradient(stops: Vec<ColorStop>) -> Self {
        Self {
            mode: ColorMode::Gradient,
            stops: StopList::new(stops),
            ..Default::default()
        }
    }

    /// Multi-gradient configuration over `segments`
    pub fn multi_gradient(segments: Vec<GradientSegment>) -> Self {
        Self {
            mode: ColorMode::MultiGradient,
            stops: StopList::default(),
            segments,
            ..Default::default()
        }
    }

    /// Builder: set the color source
    pub fn with_source(mut self, source: ColorSource) -> Self {
        self.source = source;
        self
    }

    /// The first sorted stop's color, white if there are none
    pub fn primary(&self) -> Rgb {
        self.stops
            .sorted()
            .first()
            .map(|s| s.color)
            .unwrap_or(Rgb::WHITE)
    }

    /// Resolve the color at `t`
    pub fn color_at(&self, t: f32) -> Rgb {
        color_at(self, t)
    }

    /// Stops flattened into `(offset 0..=1, color)` pairs for building a
    /// canvas gradient; multi-gradient segments are mapped to master offsets
    pub fn gradient_stops(&self) -> Vec<(f32, Rgb)> {
        let mut flat: Vec<ColorStop> = match self.mode {
            ColorMode::Single => self.stops.sorted().iter().take(1).copied().collect(),
            ColorMode::Gradient => self.stops.sorted().to_vec(),
            ColorMode::MultiGradient => self
                .segments
                .iter()
                .flat_map(|segment| segment.master_stops())
                .collect(),
        };
        flat.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        flat.into_iter()
            .map(|stop| ((stop.offset / 100.0).clamp(0.0, 1.0), stop.color))
            .collect()
    }
}

/// Interpolate between sorted stops at `t` (stops use `0..=100` offsets).
///
/// Empty lists yield white, a single stop yields its color, and positions
/// outside the stop range clamp to the nearest endpoint.
pub fn color_from_stops(sorted: &[ColorStop], t: f32) -> Rgb {
    let (first, last) = match sorted {
        [] => return Rgb::WHITE,
        [only] => return only.color,
        [first, .., last] => (first, last),
    };

    let percent = t * 100.0;
    let (start, end) = sorted
        .windows(2)
        .find(|pair| percent >= pair[0].offset && percent <= pair[1].offset)
        .map(|pair| (&pair[0], &pair[1]))
        .unwrap_or((first, last));

    if percent < start.offset {
        return start.color;
    }
    if percent > end.offset {
        return end.color;
    }

    let range = end.offset - start.offset;
    let local = if range == 0.0 {
        0.0
    } else {
        (percent - start.offset) / range
    };
    Rgb::lerp_floor(start.color, end.color, local)
}

/// Blend every segment with non-zero influence at `t`
pub fn multi_gradient_color(segments: &[GradientSegment], t: f32) -> Rgb {
    let percent = t * 100.0;
    let weighted: Vec<(f32, &GradientSegment)> = segments
        .iter()
        .map(|segment| (segment.influence(percent), segment))
        .filter(|(weight, _)| *weight > 0.0)
        .collect();

    match weighted.as_slice() {
        [] => Rgb::BLACK,
        [(_, segment)] => segment.color_at_percent(percent),
        _ => {
            let mut total = 0.0f32;
            let mut sum = [0.0f32; 3];
            for &(weight, segment) in &weighted {
                let color = segment.color_at_percent(percent);
                sum[0] += color.r as f32 * weight;
                sum[1] += color.g as f32 * weight;
                sum[2] += color.b as f32 * weight;
                total += weight;
            }
            Rgb::new(
                (sum[0] / total).floor() as u8,
                (sum[1] / total).floor() as u8,
                (sum[2] / total).floor() as u8,
            )
        }
    }
}

/// Resolve a color for `t` under `config`. Total: NaN `t` is treated as 0.
pub fn color_at(config: &ColorConfig, t: f32) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t };
    match config.mode {
        ColorMode::Single => config.primary(),
        ColorMode::Gradient => color_from_stops(config.stops.sorted(), t),
        ColorMode::MultiGradient => multi_gradient_color(&config.segments, t),
    }
}
