//! segtrack - Line segment detection for Rust
//!
//! Finds the horizontal and vertical strokes (rulings, table borders,
//! underlines) of a grayscale image, where dark pixels are ink.
//!
//! # Overview
//!
//! The image is swept column by column and row by row. On every scanline
//! the dark runs are extracted and matched against trackers that predict
//! where each stroke should continue. Strokes passing under each other,
//! small gaps and merging strokes are resolved during the sweep. The raw
//! segments are then linked across gaps, deduplicated between the two
//! sweeps and filtered by length.
//!
//! # Example
//!
//! ```
//! use segtrack::{GrayImage, SegDetParams, detect_lines};
//!
//! // a 3 pixel wide vertical stroke on a white image
//! let mut image = GrayImage::new(40, 60, 255);
//! for y in 0..60 {
//!     for x in 12..15 {
//!         image.set(x, y, 0);
//!     }
//! }
//!
//! let segments = detect_lines(&image, &SegDetParams::default()).unwrap();
//! assert_eq!(segments.len(), 1);
//! assert_eq!(segments[0].length, 60);
//! assert!(!segments[0].is_horizontal());
//! ```

// Re-export core types (images, segments, configuration, errors)
pub use segtrack_core::*;

// Re-export the stages as modules
pub use segtrack_postprocess as postprocess;
pub use segtrack_process as process;

use log::debug;
use segtrack_postprocess::PostprocessReport;
use segtrack_process::TraversalStats;

/// Counters gathered along a detection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionReport {
    /// Horizontal sweep (empty when the sweep did not run)
    pub horizontal: TraversalStats,
    /// Vertical sweep (empty when the sweep did not run)
    pub vertical: TraversalStats,
    pub postprocess: PostprocessReport,
}

/// Segments found in an image, with the counters of the run
#[derive(Debug, Clone)]
pub struct Detection {
    /// Horizontal segments followed by vertical ones
    pub segments: Vec<Segment>,
    pub report: DetectionReport,
}

/// Detect line segments, keeping the counters of the run
///
/// # Arguments
///
/// * `image` - Grayscale image, small values are strokes
/// * `params` - Detector configuration
///
/// # Errors
///
/// Returns a configuration error before any scanline is processed when
/// `params` does not validate.
pub fn detect_lines_with_report(image: &GrayImage, params: &SegDetParams) -> Result<Detection> {
    let sweeps = segtrack_process::process(image, params)?;
    let report_h = sweeps.horizontal.stats;
    let report_v = sweeps.vertical.stats;

    let (segments, postprocess) = segtrack_postprocess::postprocess(
        sweeps.horizontal.segments,
        sweeps.vertical.segments,
        image.width(),
        image.height(),
        params,
    );
    debug!(
        "{} segments detected in {}x{} image",
        segments.len(),
        image.width(),
        image.height()
    );

    Ok(Detection {
        segments,
        report: DetectionReport {
            horizontal: report_h,
            vertical: report_v,
            postprocess,
        },
    })
}

/// Detect line segments
///
/// Horizontal segments come first, then vertical ones. Each group keeps
/// the order in which its sweep emitted the segments.
///
/// # Errors
///
/// Returns a configuration error when `params` does not validate.
pub fn detect_lines(image: &GrayImage, params: &SegDetParams) -> Result<Vec<Segment>> {
    detect_lines_with_report(image, params).map(|detection| detection.segments)
}

/// Detect line segments with default parameters adapted to the image
///
/// Only `min_length` is chosen by the caller; strokes may be as thick as
/// 40% of the largest image dimension.
pub fn detect_lines_auto(image: &GrayImage, min_length: u32) -> Result<Vec<Segment>> {
    let params = SegDetParams::new()
        .with_min_length(min_length)
        .adapted_to(image);
    detect_lines(image, &params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut image = GrayImage::new(30, 30, 255);
        for x in 0..30 {
            image.set(x, 10, 0);
        }
        let detection = detect_lines_with_report(&image, &SegDetParams::default()).unwrap();
        assert_eq!(detection.segments.len(), 1);
        assert!(detection.segments[0].is_horizontal());
        assert_eq!(detection.report.horizontal.scanlines, 30);
        assert_eq!(detection.report.vertical.scanlines, 30);
        assert_eq!(detection.report.horizontal.emitted, 1);
    }

    #[test]
    fn test_invalid_params() {
        let image = GrayImage::new(8, 8, 255);
        let params = SegDetParams::new().with_threshold_intersection(0.0);
        let err = detect_lines(&image, &params).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_auto_parameters() {
        let image = GrayImage::new(10, 10, 255);
        assert!(detect_lines_auto(&image, 5).unwrap().is_empty());
    }
}
