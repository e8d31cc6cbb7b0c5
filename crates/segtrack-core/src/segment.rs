//! Detected line segments

use crate::span::{Orientation, Span};
use serde::{Deserialize, Serialize};

/// A detected straight stroke
///
/// Spans are ordered by scanline. Occluded spans cover scanlines where the
/// stroke was not observed but its tracker was kept alive (passing under
/// another stroke, or inside a tolerated gap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub spans: Vec<Span>,
    pub occluded_spans: Vec<Span>,
    pub orientation: Orientation,
    pub first_span: Span,
    pub last_span: Span,
    /// Number of scanlines from the first to the last span, inclusive
    pub length: u32,
    /// Pixels covered by the observed spans
    pub pixel_count: u32,
    /// Slope measured at the start of the stroke
    pub first_part_slope: f32,
    /// Slope measured at the end of the stroke
    pub last_part_slope: f32,
}

impl Segment {
    /// Build a segment from scanline-ordered spans
    ///
    /// Returns `None` when `spans` is empty.
    pub fn new(
        spans: Vec<Span>,
        occluded_spans: Vec<Span>,
        orientation: Orientation,
        first_part_slope: f32,
        last_part_slope: f32,
    ) -> Option<Self> {
        let first_span = *spans.first()?;
        let last_span = *spans.last()?;
        let pixel_count = spans.iter().map(span_pixels).sum();
        Some(Self {
            length: last_span.t - first_span.t + 1,
            spans,
            occluded_spans,
            orientation,
            first_span,
            last_span,
            pixel_count,
            first_part_slope,
            last_part_slope,
        })
    }

    pub fn is_horizontal(&self) -> bool {
        self.orientation == Orientation::Horizontal
    }

    /// Image coordinates of the first and last span centers
    pub fn endpoints(&self) -> ((f32, f32), (f32, f32)) {
        let start = self
            .orientation
            .to_xy(self.first_span.t as f32, self.first_span.position);
        let end = self
            .orientation
            .to_xy(self.last_span.t as f32, self.last_span.position);
        (start, end)
    }

    /// Append `other`, which must start after `self` ends
    pub fn absorb(&mut self, other: Segment) {
        self.length = other.last_span.t - self.first_span.t + 1;
        self.pixel_count += other.pixel_count;
        self.last_part_slope = other.last_part_slope;
        self.last_span = other.last_span;
        self.spans.extend(other.spans);
        self.occluded_spans.extend(other.occluded_spans);
    }
}

fn span_pixels(span: &Span) -> u32 {
    span.thickness.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(ts: std::ops::Range<u32>, position: f32) -> Vec<Span> {
        ts.map(|t| Span::new(t, position, 3.0, 0.0)).collect()
    }

    #[test]
    fn test_new() {
        assert!(Segment::new(vec![], vec![], Orientation::Vertical, 0.0, 0.0).is_none());

        let seg = Segment::new(spans(5..15, 2.0), vec![], Orientation::Vertical, 0.0, 0.0).unwrap();
        assert_eq!(seg.length, 10);
        assert_eq!(seg.pixel_count, 30);
        assert_eq!(seg.endpoints(), ((2.0, 5.0), (2.0, 14.0)));
        assert!(!seg.is_horizontal());
    }

    #[test]
    fn test_absorb() {
        let mut a = Segment::new(spans(0..10, 2.0), vec![], Orientation::Horizontal, 0.1, 0.2)
            .unwrap();
        let b = Segment::new(
            spans(12..20, 3.0),
            vec![Span::new(11, 2.5, 3.0, 0.0)],
            Orientation::Horizontal,
            0.3,
            0.4,
        )
        .unwrap();
        a.absorb(b);
        assert_eq!(a.length, 20);
        assert_eq!(a.pixel_count, 54);
        assert_eq!(a.last_part_slope, 0.4);
        assert_eq!(a.first_part_slope, 0.1);
        assert_eq!(a.last_span.t, 19);
        assert_eq!(a.spans.len(), 18);
        assert_eq!(a.occluded_spans.len(), 1);
        assert_eq!(a.occluded_spans[0].t, 11);
    }
}
