//! Removal of strokes found by both sweeps
//!
//! A thick blob or a short stroke can be tracked by the horizontal and
//! the vertical sweep alike. A segment whose pixels are mostly covered by
//! segments of the other orientation is treated as such a duplicate.

use crate::raster::{render_segments, segment_pixels};
use log::trace;
use segtrack_core::{LabelImage, SegDetParams, Segment};

/// Fraction of the pixels of `segment` covered by `mask`
///
/// # Returns
///
/// `None` when the segment covers no pixel of the image.
pub fn covered_fraction(segment: &Segment, mask: &LabelImage) -> Option<f32> {
    let (total, covered) = segment_pixels(segment, mask.width(), mask.height())
        .fold((0usize, 0usize), |(total, covered), (x, y)| {
            (total + 1, covered + usize::from(mask.get(x, y) != 0))
        });
    (total > 0).then(|| covered as f32 / total as f32)
}

/// Drop the segments of `removable` covered by `reference`
///
/// A segment is dropped when the covered fraction of its pixels exceeds
/// `threshold`, or when it covers no pixel.
///
/// # Returns
///
/// The number of segments dropped.
pub fn remove_covered(
    reference: &[Segment],
    removable: &mut Vec<Segment>,
    width: usize,
    height: usize,
    threshold: f32,
) -> usize {
    let mask = render_segments(reference, width, height);
    let before = removable.len();
    removable.retain(|segment| match covered_fraction(segment, &mask) {
        Some(fraction) if fraction <= threshold => true,
        fraction => {
            trace!(
                "duplicate {:?} segment {:?} -> {:?} (covered {:?})",
                segment.orientation,
                segment.first_span.t,
                segment.last_span.t,
                fraction
            );
            false
        }
    });
    before - removable.len()
}

/// Remove duplicates between the two sweeps
///
/// Vertical segments are checked against the horizontal ones first, then
/// horizontal segments against the vertical ones that remain.
pub fn remove_duplicates(
    horizontal: &mut Vec<Segment>,
    vertical: &mut Vec<Segment>,
    width: usize,
    height: usize,
    params: &SegDetParams,
) -> usize {
    let threshold = params.threshold_intersection;
    remove_covered(horizontal, vertical, width, height, threshold)
        + remove_covered(vertical, horizontal, width, height, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use segtrack_core::{Orientation, Span};

    fn segment(
        orientation: Orientation,
        ts: std::ops::Range<u32>,
        position: f32,
        thickness: f32,
    ) -> Segment {
        let spans = ts.map(|t| Span::new(t, position, thickness, 0.0)).collect();
        Segment::new(spans, vec![], orientation, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_covered_fraction() {
        let mask = render_segments(
            &[segment(Orientation::Horizontal, 0..20, 10.0, 5.0)],
            20,
            20,
        );
        // x 9..=11 over y 0..=19; rows 8..=12 are covered
        let crossing = segment(Orientation::Vertical, 0..20, 10.0, 3.0);
        assert_eq!(covered_fraction(&crossing, &mask), Some(15.0 / 60.0));
        let outside = segment(Orientation::Vertical, 30..40, 10.0, 3.0);
        assert_eq!(covered_fraction(&outside, &mask), None);
    }

    #[test]
    fn test_blob_found_twice() {
        let p = SegDetParams::default();
        // a 6x6 blob seen as a short stroke by both sweeps
        let mut horizontal = vec![segment(Orientation::Horizontal, 10..16, 12.5, 6.0)];
        let mut vertical = vec![
            segment(Orientation::Vertical, 10..16, 12.5, 6.0),
            segment(Orientation::Vertical, 0..30, 25.0, 3.0),
        ];
        assert_eq!(remove_duplicates(&mut horizontal, &mut vertical, 30, 30, &p), 1);
        assert_eq!(horizontal.len(), 1);
        assert_eq!(vertical.len(), 1);
        assert_eq!(vertical[0].first_span.position, 25.0);
    }

    #[test]
    fn test_crossing_strokes_are_kept() {
        let p = SegDetParams::default();
        let mut horizontal = vec![segment(Orientation::Horizontal, 0..30, 15.0, 3.0)];
        let mut vertical = vec![segment(Orientation::Vertical, 0..30, 15.0, 3.0)];
        assert_eq!(remove_duplicates(&mut horizontal, &mut vertical, 30, 30, &p), 0);
    }
}
