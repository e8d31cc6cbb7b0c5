//! segtrack-postprocess - Segment postprocessing
//!
//! Raw segments from the sweeps go through three stages:
//!
//! - [`linking`]: fragments of one stroke are joined across gaps
//! - [`duplicates`]: strokes found by both sweeps are kept once
//! - length filtering: segments shorter than `min_length` are dropped
//!
//! [`raster`] maps spans back to image pixels for duplicate detection.

pub mod duplicates;
pub mod linking;
pub mod raster;

pub use duplicates::{covered_fraction, remove_covered, remove_duplicates};
pub use linking::{link_cost, link_segments};
pub use raster::{render_segments, segment_pixels, span_pixels};

use log::debug;
use segtrack_core::{SegDetParams, Segment, TraversalMode};

/// Counters of a postprocessing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostprocessReport {
    /// Merges performed by linking
    pub linked: usize,
    /// Segments removed as duplicates of the other sweep
    pub duplicates_removed: usize,
    /// Segments dropped by the length filter
    pub too_short: usize,
}

/// Keep the segments at least `min_length` scanlines long
///
/// # Returns
///
/// The kept segments, in input order, and the number dropped.
pub fn filter_length(segments: Vec<Segment>, min_length: u32) -> (Vec<Segment>, usize) {
    let before = segments.len();
    let kept: Vec<Segment> = segments
        .into_iter()
        .filter(|s| s.length >= min_length)
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Link, deduplicate and filter the segments of both sweeps
///
/// # Arguments
///
/// * `horizontal` - Raw segments of the horizontal sweep
/// * `vertical` - Raw segments of the vertical sweep
/// * `width` - Width of the swept image
/// * `height` - Height of the swept image
/// * `params` - Detector configuration
///
/// # Returns
///
/// Horizontal segments followed by vertical ones, and the counters.
pub fn postprocess(
    mut horizontal: Vec<Segment>,
    mut vertical: Vec<Segment>,
    width: usize,
    height: usize,
    params: &SegDetParams,
) -> (Vec<Segment>, PostprocessReport) {
    let mut report = PostprocessReport {
        linked: link_segments(&mut horizontal, params) + link_segments(&mut vertical, params),
        ..PostprocessReport::default()
    };

    if params.remove_duplicates && params.traversal_mode == TraversalMode::HorizontalVertical {
        report.duplicates_removed =
            remove_duplicates(&mut horizontal, &mut vertical, width, height, params);
    }

    horizontal.append(&mut vertical);
    let (segments, too_short) = filter_length(horizontal, params.min_length);
    report.too_short = too_short;

    debug!(
        "postprocess: {} linked, {} duplicates, {} too short, {} segments kept",
        report.linked,
        report.duplicates_removed,
        report.too_short,
        segments.len()
    );

    (segments, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use segtrack_core::{Orientation, Span};

    fn segment(orientation: Orientation, ts: std::ops::Range<u32>, position: f32) -> Segment {
        let spans = ts.map(|t| Span::new(t, position, 3.0, 0.0)).collect();
        Segment::new(spans, vec![], orientation, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_filter_length() {
        let segments = vec![
            segment(Orientation::Vertical, 0..9, 2.0),
            segment(Orientation::Vertical, 0..10, 6.0),
            segment(Orientation::Vertical, 0..30, 10.0),
        ];
        let (kept, dropped) = filter_length(segments, 10);
        assert_eq!(dropped, 1);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].length, 10);
    }

    #[test]
    fn test_output_order() {
        let p = SegDetParams::default();
        let (segments, report) = postprocess(
            vec![segment(Orientation::Horizontal, 0..40, 5.0)],
            vec![segment(Orientation::Vertical, 0..40, 30.0)],
            40,
            40,
            &p,
        );
        assert_eq!(report, PostprocessReport::default());
        assert_eq!(segments.len(), 2);
        assert!(segments[0].is_horizontal());
        assert!(!segments[1].is_horizontal());
    }

    #[test]
    fn test_duplicates_need_both_sweeps() {
        let blob_h = segment(Orientation::Horizontal, 10..13, 11.0);
        let blob_v = segment(Orientation::Vertical, 10..13, 11.0);
        let p = SegDetParams::default().with_min_length(1);

        let (segments, report) =
            postprocess(vec![blob_h.clone()], vec![blob_v.clone()], 20, 20, &p);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(segments.len(), 1);

        let p = p.with_remove_duplicates(false);
        let (segments, report) = postprocess(vec![blob_h], vec![blob_v], 20, 20, &p);
        assert_eq!(report.duplicates_removed, 0);
        assert_eq!(segments.len(), 2);
    }
}
