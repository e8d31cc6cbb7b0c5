//! Scanline sweeps
//!
//! # Algorithm Overview
//!
//! For every scanline `t` of a sweep:
//!
//! 1. **Predict** every live tracker for `t`.
//! 2. **Extract** the observations of the scanline.
//! 3. **Match** observations to trackers through the bucket index,
//!    spawning trackers for what nobody claims.
//! 4. **Select**: integrate, keep under occlusion or terminate each
//!    tracker, fusing duplicates after a long run of contested scanlines.
//! 5. Carry the survivors, newly spawned trackers first, to `t + 1`.
//!
//! Trackers still alive after the last scanline are flushed into segments.
//!
//! The horizontal sweep reads columns (through a transposed copy of the
//! image) and yields horizontal segments; the vertical sweep reads rows.
//! The two sweeps share no state.

use crate::bucket::BucketIndex;
use crate::lifecycle::{select_trackers, terminate};
use crate::matching::match_observations;
use crate::observation::extract_observations;
use crate::tracker::Tracker;
use log::debug;
use segtrack_core::{GrayImage, Orientation, Result, SegDetParams, Segment};

/// Counters of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Scanlines processed
    pub scanlines: usize,
    /// Observations extracted
    pub observations: usize,
    /// Trackers spawned
    pub spawned: usize,
    /// Observations accepted by two trackers or more
    pub contested_observations: usize,
    /// Trackers removed by fusion
    pub fused: usize,
    /// Segments emitted
    pub emitted: usize,
    /// Trackers terminated too short to become segments
    pub discarded: usize,
}

/// Output of one sweep
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    pub segments: Vec<Segment>,
    pub stats: TraversalStats,
}

/// Output of the sweeps selected by the traversal mode
#[derive(Debug, Clone, Default)]
pub struct Sweeps {
    pub horizontal: Traversal,
    pub vertical: Traversal,
}

/// Track strokes across a sequence of scanlines
///
/// # Arguments
///
/// * `scanlines` - Scanlines in sweep order, each `n_max` samples long
/// * `n_max` - Length of a scanline
/// * `orientation` - Orientation given to the produced segments
/// * `params` - Detector configuration, assumed valid
pub fn traverse<'a>(
    scanlines: impl IntoIterator<Item = &'a [u8]>,
    n_max: usize,
    orientation: Orientation,
    params: &SegDetParams,
) -> Traversal {
    let mut trackers: Vec<Tracker> = Vec::new();
    let mut index = BucketIndex::new(n_max, params.bucket_size);
    let mut segments = Vec::new();
    let mut stats = TraversalStats::default();
    let mut contested_run = 0usize;

    for (t, line) in scanlines.into_iter().enumerate() {
        let t = t as u32;
        for tracker in &mut trackers {
            tracker.predict(t);
        }

        let observations = extract_observations(line, params);
        index.rebuild(
            trackers
                .iter()
                .enumerate()
                .map(|(id, tracker)| (id, tracker.prediction().position)),
        );
        let outcome = match_observations(&mut trackers, &mut index, &observations, t, params);

        contested_run = if outcome.contested > 0 {
            contested_run + 1
        } else {
            0
        };
        stats.scanlines += 1;
        stats.observations += observations.len();
        stats.spawned += outcome.spawned.len();
        stats.contested_observations += outcome.contested;

        let kept = select_trackers(
            std::mem::take(&mut trackers),
            &observations,
            &outcome.merged,
            t,
            contested_run,
            orientation,
            params,
            &mut segments,
            &mut stats,
        );
        trackers = outcome.spawned;
        trackers.extend(kept);
    }

    for tracker in trackers {
        if terminate(tracker, orientation, params, &mut segments) {
            stats.emitted += 1;
        } else {
            stats.discarded += 1;
        }
    }

    debug!(
        "{:?} sweep: {} scanlines, {} observations, {} trackers spawned, {} fused, {} segments",
        orientation,
        stats.scanlines,
        stats.observations,
        stats.spawned,
        stats.fused,
        segments.len()
    );

    Traversal { segments, stats }
}

/// Sweep the columns of `image`, producing horizontal segments
pub fn traverse_horizontal(image: &GrayImage, params: &SegDetParams) -> Traversal {
    let columns = image.transpose();
    traverse(
        columns.rows(),
        columns.width(),
        Orientation::Horizontal,
        params,
    )
}

/// Sweep the rows of `image`, producing vertical segments
pub fn traverse_vertical(image: &GrayImage, params: &SegDetParams) -> Traversal {
    traverse(image.rows(), image.width(), Orientation::Vertical, params)
}

/// Run the sweeps selected by `params.traversal_mode`
///
/// With `params.negate_image` the sweeps read an inverted copy of `image`.
///
/// # Errors
///
/// Returns a configuration error when `params` does not validate. No
/// scanline is processed in that case.
pub fn process(image: &GrayImage, params: &SegDetParams) -> Result<Sweeps> {
    params.validate()?;
    let negated;
    let image = if params.negate_image {
        negated = image.invert();
        &negated
    } else {
        image
    };
    let mode = params.traversal_mode;
    Ok(Sweeps {
        horizontal: if mode.horizontal() {
            traverse_horizontal(image, params)
        } else {
            Traversal::default()
        },
        vertical: if mode.vertical() {
            traverse_vertical(image, params)
        } else {
            Traversal::default()
        },
    })
}
