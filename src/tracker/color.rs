//! HSV color model and color-range thresholding.
//!
//! Hue uses the 8-bit half-degree scale (`0..180`), saturation and value use
//! the full `0..=255` range. This matches the ranges the tracker parameters
//! were tuned against.

use image::Luma;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use super::error::TrackerError;
use super::{FOREGROUND, Frame, Mask};

/// A single HSV color sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hsv {
    /// Hue in half degrees, `0..180`
    pub h: u8,
    /// Saturation, `0..=255`
    pub s: u8,
    /// Value, `0..=255`
    pub v: u8,
}

impl Hsv {
    #[inline]
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

impl From<(u8, u8, u8)> for Hsv {
    fn from((h, s, v): (u8, u8, u8)) -> Self {
        Self::new(h, s, v)
    }
}

/// Inclusive lower/upper HSV bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawColorRange")]
pub struct ColorRange {
    lower: Hsv,
    upper: Hsv,
}

#[derive(Deserialize)]
struct RawColorRange {
    lower: Hsv,
    upper: Hsv,
}

impl TryFrom<RawColorRange> for ColorRange {
    type Error = TrackerError;

    fn try_from(raw: RawColorRange) -> Result<Self, Self::Error> {
        Self::new(raw.lower, raw.upper)
    }
}

impl Default for ColorRange {
    fn default() -> Self {
        Self::blue()
    }
}

impl ColorRange {
    /// Create a range, rejecting any channel whose lower bound exceeds its upper bound.
    pub fn new(lower: impl Into<Hsv>, upper: impl Into<Hsv>) -> Result<Self, TrackerError> {
        let lower = lower.into();
        let upper = upper.into();
        for (channel, lo, hi) in [
            ("hue", lower.h, upper.h),
            ("saturation", lower.s, upper.s),
            ("value", lower.v, upper.v),
        ] {
            if lo > hi {
                return Err(TrackerError::InvalidColorRange {
                    channel,
                    lower: lo,
                    upper: hi,
                });
            }
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> Hsv {
        self.lower
    }

    pub fn upper(&self) -> Hsv {
        self.upper
    }

    /// Whether `hsv` lies inside the range, bounds included.
    #[inline]
    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }

    pub const fn blue() -> Self {
        Self {
            lower: Hsv::new(100, 100, 100),
            upper: Hsv::new(135, 255, 255),
        }
    }

    pub const fn green() -> Self {
        Self {
            lower: Hsv::new(30, 50, 50),
            upper: Hsv::new(80, 255, 255),
        }
    }

    pub const fn orange() -> Self {
        Self {
            lower: Hsv::new(5, 50, 50),
            upper: Hsv::new(30, 255, 255),
        }
    }

    pub const fn red() -> Self {
        Self {
            lower: Hsv::new(0, 50, 50),
            upper: Hsv::new(20, 255, 255),
        }
    }

    /// Look up a preset by name (`blue`, `green`, `orange`, `red`).
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "blue" => Some(Self::blue()),
            "green" => Some(Self::green()),
            "orange" => Some(Self::orange()),
            "red" => Some(Self::red()),
            _ => None,
        }
    }
}

/// Convert one 8-bit BGR pixel to HSV.
pub fn bgr_to_hsv(b: u8, g: u8, r: u8) -> Hsv {
    let (bf, gf, rf) = (b as f32, g as f32, r as f32);
    let v = bf.max(gf).max(rf);
    let min = bf.min(gf).min(rf);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    let mut h = (h / 2.0).round();
    if h >= 180.0 {
        h -= 180.0;
    }

    Hsv {
        h: h as u8,
        s: s.round().clamp(0.0, 255.0) as u8,
        v: v as u8,
    }
}

/// Convert a BGR frame to an HSV frame of the same shape.
pub fn to_hsv(frame: &Frame) -> Frame {
    let (height, width, _) = frame.dim();
    let mut hsv = Array3::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            let Hsv { h, s, v } = bgr_to_hsv(frame[[y, x, 0]], frame[[y, x, 1]], frame[[y, x, 2]]);
            hsv[[y, x, 0]] = h;
            hsv[[y, x, 1]] = s;
            hsv[[y, x, 2]] = v;
        }
    }
    hsv
}

/// Threshold an HSV frame: a pixel is set (255) iff every channel lies within `range`.
pub fn in_range_mask(hsv: &Frame, range: &ColorRange) -> Mask {
    let (height, width, _) = hsv.dim();
    Mask::from_fn(width as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let inside = range.contains(Hsv::new(hsv[[y, x, 0]], hsv[[y, x, 1]], hsv[[y, x, 2]]));
        Luma([if inside { FOREGROUND } else { 0 }])
    })
}
