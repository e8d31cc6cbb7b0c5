//! Span rasterization
//!
//! Spans live in sweep coordinates; these functions map the pixels they
//! cover back to image (x, y), clipped to the image.

use segtrack_core::{LabelImage, Orientation, Segment, Span};

/// Image pixels covered by `span`
///
/// # Arguments
///
/// * `span` - Span to rasterize
/// * `orientation` - Orientation of the segment owning the span
/// * `width` - Image width
/// * `height` - Image height
pub fn span_pixels(
    span: &Span,
    orientation: Orientation,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let (along, across) = match orientation {
        Orientation::Horizontal => (width, height),
        Orientation::Vertical => (height, width),
    };
    let t = span.t as usize;
    let range = span
        .pixel_range()
        .filter(|&(lo, hi)| t < along && across > 0 && hi >= 0 && lo < across as i64)
        .map(|(lo, hi)| lo.max(0) as usize..=(hi as usize).min(across - 1));
    range.into_iter().flatten().map(move |p| match orientation {
        Orientation::Horizontal => (t, p),
        Orientation::Vertical => (p, t),
    })
}

/// Image pixels covered by the observed spans of `segment`
pub fn segment_pixels(
    segment: &Segment,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> + '_ {
    segment
        .spans
        .iter()
        .flat_map(move |span| span_pixels(span, segment.orientation, width, height))
}

/// Render the observed spans of `segments` into a label image
///
/// Segment `i` is drawn with label `i + 1`, saturating at `u16::MAX`. Where
/// segments overlap the later one wins.
pub fn render_segments(segments: &[Segment], width: usize, height: usize) -> LabelImage {
    let mut labels = LabelImage::new(width, height);
    for (i, segment) in segments.iter().enumerate() {
        let label = (i + 1).min(u16::MAX as usize) as u16;
        for (x, y) in segment_pixels(segment, width, height) {
            labels.set(x, y, label);
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(orientation: Orientation, ts: std::ops::Range<u32>, position: f32) -> Segment {
        let spans = ts.map(|t| Span::new(t, position, 3.0, 0.0)).collect();
        Segment::new(spans, vec![], orientation, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_span_pixels_mapping() {
        let span = Span::new(4, 10.0, 3.0, 0.0);
        let h: Vec<_> = span_pixels(&span, Orientation::Horizontal, 20, 20).collect();
        assert_eq!(h, vec![(4, 9), (4, 10), (4, 11)]);
        let v: Vec<_> = span_pixels(&span, Orientation::Vertical, 20, 20).collect();
        assert_eq!(v, vec![(9, 4), (10, 4), (11, 4)]);
    }

    #[test]
    fn test_span_pixels_clipped() {
        let edge = Span::new(0, 0.0, 3.0, 0.0);
        assert_eq!(span_pixels(&edge, Orientation::Vertical, 5, 5).count(), 2);
        let far = Span::new(0, 4.0, 3.0, 0.0);
        assert_eq!(span_pixels(&far, Orientation::Vertical, 5, 5).count(), 2);
        let outside = Span::new(7, 2.0, 3.0, 0.0);
        assert_eq!(span_pixels(&outside, Orientation::Vertical, 5, 5).count(), 0);
        let empty = Span::new(0, 2.5, 0.0, 0.0);
        assert_eq!(span_pixels(&empty, Orientation::Vertical, 5, 5).count(), 0);
    }

    #[test]
    fn test_render_segments() {
        let segments = vec![
            segment(Orientation::Vertical, 0..10, 5.0),
            segment(Orientation::Horizontal, 2..8, 5.0),
        ];
        let labels = render_segments(&segments, 12, 12);
        assert_eq!(labels.get(5, 0), 1);
        assert_eq!(labels.get(4, 9), 1);
        // the crossing pixels belong to the later segment
        assert_eq!(labels.get(5, 5), 2);
        assert_eq!(labels.get(2, 4), 2);
        assert_eq!(labels.get(0, 0), 0);
        assert_eq!(labels.count_foreground(), 30 + 18 - 9);
    }
}
