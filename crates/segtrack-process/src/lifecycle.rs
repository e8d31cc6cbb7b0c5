//! Tracker lifecycle selection
//!
//! After matching, every tracker of the sweep goes through one of three
//! fates:
//!
//! - **integrate**: it holds a candidate observation, which is absorbed;
//!   a merged observation is only followed, for at most
//!   `minimum_for_fusion` consecutive scanlines;
//! - **continue**: nothing matched, but it passes under another stroke or
//!   the gap since its last integration is tolerated;
//! - **terminate**: it is turned into a segment when long enough, dropped
//!   silently otherwise.
//!
//! A tracker whose slope drifts past `max_slope` is terminated before any
//! of these. Once a sweep has seen more than `minimum_for_fusion`
//! consecutive scanlines with contested observations, duplicate trackers
//! are fused first.

use crate::fusion::fuse_trackers;
use crate::observation::Observation;
use crate::tracker::Tracker;
use crate::traversal::TraversalStats;
use log::trace;
use segtrack_core::{Orientation, SegDetParams, Segment};

/// Terminate a tracker, keeping it as a segment when long enough
///
/// # Returns
///
/// `true` when a segment was emitted.
pub fn terminate(
    tracker: Tracker,
    orientation: Orientation,
    params: &SegDetParams,
    segments: &mut Vec<Segment>,
) -> bool {
    if tracker.extent() <= params.embryo_length() {
        trace!(
            "discarded tracker {}..={}",
            tracker.first_t(),
            tracker.last_integration_t()
        );
        return false;
    }
    match tracker.into_segment(orientation, 0) {
        Some(segment) => {
            segments.push(segment);
            true
        }
        None => false,
    }
}

/// Decide the fate of every tracker after scanline `t`
///
/// # Arguments
///
/// * `trackers` - Matched tracker arena, consumed
/// * `observations` - Observations of the scanline, indexed by candidates
/// * `merged` - Per observation, whether it joins several strokes
/// * `t` - Scanline index
/// * `contested_run` - Consecutive scanlines with a contested observation
/// * `orientation` - Orientation of the sweep
/// * `params` - Detector configuration
/// * `segments` - Receives terminated trackers
/// * `stats` - Sweep counters
///
/// # Returns
///
/// The surviving trackers, in arena order.
#[allow(clippy::too_many_arguments)]
pub fn select_trackers(
    mut trackers: Vec<Tracker>,
    observations: &[Observation],
    merged: &[bool],
    t: u32,
    contested_run: usize,
    orientation: Orientation,
    params: &SegDetParams,
    segments: &mut Vec<Segment>,
    stats: &mut TraversalStats,
) -> Vec<Tracker> {
    if contested_run > params.minimum_for_fusion {
        let fusion = fuse_trackers(&mut trackers, orientation, params, segments);
        stats.fused += fusion.fused;
        stats.emitted += fusion.emitted;
    }

    let mut kept = Vec::with_capacity(trackers.len());
    for mut tracker in trackers {
        let fate_continue = if tracker.exceeds_slope(params) {
            false
        } else if let Some(candidate) = tracker.candidate() {
            let observation = &observations[candidate.index];
            if merged[candidate.index] {
                tracker.follow_merged(observation, t, params);
            } else {
                tracker.integrate(observation, t, params);
            }
            true
        } else if tracker.should_continue(t, params) {
            if !tracker.crossing_at(t) {
                tracker.record_gap(t);
            }
            true
        } else {
            false
        };

        if fate_continue {
            kept.push(tracker);
        } else if terminate(tracker, orientation, params, segments) {
            stats.emitted += 1;
        } else {
            stats.discarded += 1;
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use segtrack_core::TrackerStrategy;

    fn params() -> SegDetParams {
        SegDetParams::new()
            .with_tracker(TrackerStrategy::LastIntegration)
            .with_min_length_embryo(3)
    }

    fn obs(position: f32) -> Observation {
        Observation::new(position, 3.0, 0.0)
    }

    fn tracked(count: u32, p: &SegDetParams) -> Tracker {
        let mut tracker = Tracker::new(0, &obs(20.0), p);
        for t in 1..count {
            tracker.predict(t);
            tracker.integrate(&obs(20.0), t, p);
        }
        tracker.predict(count);
        tracker
    }

    #[test]
    fn test_candidate_is_integrated() {
        let p = params();
        let mut tracker = tracked(5, &p);
        tracker.offer(0, &obs(20.5));
        let mut segments = Vec::new();
        let mut stats = TraversalStats::default();
        let kept = select_trackers(
            vec![tracker],
            &[obs(20.5)],
            &[false],
            5,
            0,
            Orientation::Vertical,
            &p,
            &mut segments,
            &mut stats,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].last_integration_t(), 5);
        assert_eq!(kept[0].history().last().map(|s| s.position), Some(20.5));
    }

    #[test]
    fn test_merged_candidate_is_followed() {
        let p = params().with_minimum_for_fusion(3);
        let merged = Observation::new(22.0, 7.0, 0.0);
        let mut trackers = vec![tracked(5, &p)];
        let mut segments = Vec::new();
        let mut stats = TraversalStats::default();
        for t in 5..10 {
            trackers[0].predict(t);
            trackers[0].offer(0, &merged);
            trackers = select_trackers(
                trackers,
                &[merged],
                &[true],
                t,
                1,
                Orientation::Vertical,
                &p,
                &mut segments,
                &mut stats,
            );
        }
        // followed on 5..=7, integrated once the merge lasts longer
        assert_eq!(trackers.len(), 1);
        let occluded: Vec<u32> = trackers[0].occluded_spans().iter().map(|s| s.t).collect();
        assert_eq!(occluded, vec![5, 6, 7]);
        assert_eq!(trackers[0].last_integration_t(), 9);
        assert_eq!(trackers[0].history().len(), 7);
        assert!(segments.is_empty());
    }

    #[test]
    fn test_termination_fates() {
        let p = params();
        let mut segments = Vec::new();
        let mut stats = TraversalStats::default();
        // extent 2 is an isolated point, extent 9 is long enough
        let kept = select_trackers(
            vec![tracked(3, &p), tracked(10, &p)],
            &[],
            &[],
            10,
            0,
            Orientation::Horizontal,
            &p,
            &mut segments,
            &mut stats,
        );
        assert!(kept.is_empty());
        assert_eq!(stats.discarded, 1);
        assert_eq!(stats.emitted, 1);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].length, 10);
        assert!(segments[0].is_horizontal());
    }

    #[test]
    fn test_tolerated_gap_records_prediction() {
        let p = params().with_discontinuity(0.0, 2);
        let mut segments = Vec::new();
        let mut stats = TraversalStats::default();
        let kept = select_trackers(
            vec![tracked(10, &p)],
            &[],
            &[],
            10,
            0,
            Orientation::Vertical,
            &p,
            &mut segments,
            &mut stats,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].occluded_spans().len(), 1);
        assert_eq!(kept[0].occluded_spans()[0].t, 10);
        assert!(segments.is_empty());
    }
}
