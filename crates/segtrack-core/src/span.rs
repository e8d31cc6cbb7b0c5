//! Committed trajectory samples
//!
//! A [`Span`] is expressed in sweep coordinates: `t` is the scanline index
//! along the sweep direction and `position` the coordinate across it. The
//! [`Orientation`] of the owning segment maps those back to image (x, y).

use serde::{Deserialize, Serialize};

/// Direction of a sweep, and of the segments it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Scanlines are columns, `t = x` and `position = y`
    Horizontal,
    /// Scanlines are rows, `t = y` and `position = x`
    Vertical,
}

impl Orientation {
    /// Convert sweep coordinates into image (x, y)
    #[inline]
    pub fn to_xy(self, t: f32, position: f32) -> (f32, f32) {
        match self {
            Orientation::Horizontal => (t, position),
            Orientation::Vertical => (position, t),
        }
    }
}

/// One scanline sample of a segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Scanline index
    pub t: u32,
    /// Center of the stroke across the scanline
    pub position: f32,
    /// Stroke thickness in pixels
    pub thickness: f32,
    /// Local direction in degrees, `atan(slope)`
    pub angle: f32,
}

impl Span {
    pub fn new(t: u32, position: f32, thickness: f32, angle: f32) -> Self {
        Self {
            t,
            position,
            thickness,
            angle,
        }
    }

    /// Euclidean distance between the centers of two spans
    pub fn distance(&self, other: &Span) -> f32 {
        let dt = other.t as f32 - self.t as f32;
        let dp = other.position - self.position;
        (dt * dt + dp * dp).sqrt()
    }

    /// Inclusive range of pixel indices covered across the scanline
    ///
    /// Returns `None` when the span covers no pixel.
    pub fn pixel_range(&self) -> Option<(i64, i64)> {
        let half = self.thickness / 2.0;
        let lo = (self.position - half).ceil() as i64;
        let hi = (self.position + half).floor() as i64;
        (lo <= hi).then_some((lo, hi))
    }
}

/// Slope to angle in degrees
#[inline]
pub fn slope_to_angle(slope: f32) -> f32 {
    slope.atan().to_degrees()
}
