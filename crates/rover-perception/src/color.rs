//! Color Classifier.
//!
//! Thresholds one overhead-warped frame into three binary masks:
//!
//! | Mask | Rule |
//! |------|------|
//! | navigable | every channel strictly above the RGB threshold |
//! | obstacle  | inside the sensed field of view (any channel > 0) and not navigable |
//! | rock      | HSV value inside the inclusive `[low, high]` box |
//!
//! Navigable and obstacle are mutually exclusive by construction; rocks are
//! tested independently and may overlap either.

use rover_types::RgbImage;
use rover_types::config::{ChannelOrder, PerceptionConfig};

// ────────────────────────────────────────────────────────────────────────────
// Mask
// ────────────────────────────────────────────────────────────────────────────

/// A single-channel binary image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Mask {
    /// An all-clear mask.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    fn from_fn(image: &RgbImage, test: impl Fn([u8; 3]) -> bool) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            bits: image.pixels().map(test).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, col: usize, row: usize) -> bool {
        self.bits[row * self.width + col]
    }

    pub fn set(&mut self, col: usize, row: usize, value: bool) {
        self.bits[row * self.width + col] = value;
    }

    /// Number of set pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// `(col, row)` of every set pixel, in row-major order.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| (i % width, i / width))
    }
}

/// The three masks produced from one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainMasks {
    pub nav: Mask,
    pub obs: Mask,
    pub rock: Mask,
}

// ────────────────────────────────────────────────────────────────────────────
// Classification
// ────────────────────────────────────────────────────────────────────────────

/// Classify every pixel of an overhead frame.
pub fn classify(image: &RgbImage, cfg: &PerceptionConfig) -> TerrainMasks {
    let threshold = cfg.nav_rgb_threshold;
    let is_nav = move |p: [u8; 3]| {
        p[0] > threshold[0] && p[1] > threshold[1] && p[2] > threshold[2]
    };

    let nav = Mask::from_fn(image, is_nav);
    let obs = Mask::from_fn(image, |p| in_field_of_view(p) && !is_nav(p));
    let rock = Mask::from_fn(image, |p| {
        let hsv = to_hsv(p, cfg.hsv_channel_order);
        in_range(hsv, cfg.rock_hsv_low, cfg.rock_hsv_high)
    });

    TerrainMasks { nav, obs, rock }
}

/// Pixels outside the warped camera trapezoid are pure black.
fn in_field_of_view(p: [u8; 3]) -> bool {
    p.iter().any(|c| *c > 0)
}

fn in_range(hsv: [u8; 3], low: [u8; 3], high: [u8; 3]) -> bool {
    (0..3).all(|i| hsv[i] >= low[i] && hsv[i] <= high[i])
}

fn to_hsv(p: [u8; 3], order: ChannelOrder) -> [u8; 3] {
    match order {
        ChannelOrder::Rgb => rgb_to_hsv(p[0], p[1], p[2]),
        ChannelOrder::Bgr => rgb_to_hsv(p[2], p[1], p[0]),
    }
}

/// Convert an 8-bit RGB triple to 8-bit HSV.
///
/// Returns `[H, S, V]` with H in `[0, 180)` (degrees halved) and S, V in
/// `[0, 255]`.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    let h = ((h / 2.0).round() as u16 % 180) as u8;
    [h, s.round() as u8, max as u8]
}
