//! Observation to tracker matching
//!
//! # Algorithm Overview
//!
//! Observations of a scanline are processed left to right:
//!
//! 1. **Query**: the buckets around the observation are scanned, the
//!    window being wide enough for any tracker that could accept it or
//!    whose band could touch it.
//! 2. **Gate**: accepting trackers are taken out of their buckets. The
//!    others, when they hold no candidate yet and their band overlaps the
//!    observation, note a crossing (they pass under it).
//! 3. **Resolve**: each acceptor keeps whichever observation is nearest to
//!    its prediction. An observation is claimed by all its acceptors; every
//!    acceptor that drops it (displaced by a nearer one, or refusing it for
//!    a nearer one already held) releases its claim, and the last release
//!    spawns a fresh tracker so no observation is lost.
//! 4. **Spawn**: an observation nobody accepts spawns a tracker, unless it
//!    is at least `max_thickness` thick.
//!
//! An observation kept by trackers whose predicted bands do not all
//! overlap covers several strokes at once. It is flagged as merged so the
//! trackers can follow it without learning from it.
//!
//! Acceptors are filed back under their predicted position afterwards.

use crate::bucket::BucketIndex;
use crate::observation::Observation;
use crate::tracker::{Offer, Tracker};
use segtrack_core::SegDetParams;

/// How far from an observation a relevant tracker may be predicted
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reach {
    /// Largest position sigma among the trackers
    pub max_sigma_position: f32,
    /// Largest half predicted thickness among the trackers
    pub max_half_thickness: f32,
}

impl Reach {
    /// Reach of a tracker population after prediction
    pub fn of(trackers: &[Tracker]) -> Self {
        trackers.iter().fold(Reach::default(), |reach, tracker| Reach {
            max_sigma_position: reach.max_sigma_position.max(tracker.sigmas().position),
            max_half_thickness: reach
                .max_half_thickness
                .max(tracker.prediction().thickness.abs() / 2.0),
        })
    }

    /// Position window `[lo, hi]` to query around `observation`
    pub fn window(&self, observation: &Observation) -> (f32, f32) {
        let half = (3.0 * self.max_sigma_position)
            .max(observation.thickness / 2.0 + self.max_half_thickness);
        (observation.position - half, observation.position + half)
    }
}

/// Result of matching one scanline
#[derive(Debug, Default)]
pub struct MatchOutcome {
    /// Trackers spawned from unmatched or abandoned observations
    pub spawned: Vec<Tracker>,
    /// Observations accepted by two trackers or more
    pub contested: usize,
    /// Per observation, whether the trackers keeping it follow disjoint bands
    pub merged: Vec<bool>,
}

/// Trackers accepting `observation`, found through the index
///
/// Returns tracker handles in ascending order.
pub fn accepting_trackers(
    trackers: &[Tracker],
    index: &BucketIndex,
    reach: &Reach,
    observation: &Observation,
    params: &SegDetParams,
) -> Vec<usize> {
    if observation.thickness >= params.max_thickness as f32 {
        return Vec::new();
    }
    let (lo, hi) = reach.window(observation);
    let mut ids: Vec<usize> = index
        .query(lo, hi)
        .filter(|&id| trackers[id].accepts(observation, params))
        .collect();
    ids.sort_unstable();
    ids
}

/// Whether the predicted bands of `ids` fail to share a common pixel
fn bands_disjoint(trackers: &[Tracker], ids: &[usize]) -> bool {
    let (lo, hi) = ids
        .iter()
        .map(|&id| trackers[id].band())
        .fold((f32::MIN, f32::MAX), |(lo, hi), (a, b)| (lo.max(a), hi.min(b)));
    lo > hi
}

/// Match the observations of scanline `t` against the predicted trackers
///
/// # Arguments
///
/// * `trackers` - Tracker arena, already predicted for `t`
/// * `index` - Bucket index filed with every tracker of the arena
/// * `observations` - Observations of the scanline, left to right
/// * `t` - Scanline index
/// * `params` - Detector configuration
///
/// # Returns
///
/// The spawned trackers, the number of contested observations and which
/// observations are merged strokes. Each tracker of the arena holds its
/// chosen observation as candidate.
pub fn match_observations(
    trackers: &mut [Tracker],
    index: &mut BucketIndex,
    observations: &[Observation],
    t: u32,
    params: &SegDetParams,
) -> MatchOutcome {
    let reach = Reach::of(trackers);
    let max_thickness = params.max_thickness as f32;
    let mut claims = vec![0usize; observations.len()];
    let mut outcome = MatchOutcome::default();

    for (i, observation) in observations.iter().enumerate() {
        let (lo, hi) = reach.window(observation);
        let matchable = observation.thickness < max_thickness;

        let mut accepted = Vec::new();
        for b in index.bucket_range(lo, hi) {
            if matchable {
                let tracker_view: &[Tracker] = trackers;
                accepted.extend(
                    index.remove_matching(b, |id| tracker_view[id].accepts(observation, params)),
                );
            }
            for &id in index.bucket(b) {
                let tracker = &mut trackers[id];
                if tracker.candidate().is_none() {
                    tracker.record_crossing(observation, t);
                }
            }
        }

        if accepted.is_empty() {
            if matchable {
                outcome.spawned.push(Tracker::new(t, observation, params));
            }
            continue;
        }

        if accepted.len() > 1 {
            outcome.contested += 1;
        }
        claims[i] = accepted.len();

        for id in accepted {
            let released = match trackers[id].offer(i, observation) {
                Offer::Taken { displaced } => displaced,
                Offer::Refused => Some(i),
            };
            if let Some(j) = released {
                claims[j] -= 1;
                if claims[j] == 0 {
                    outcome
                        .spawned
                        .push(Tracker::new(t, &observations[j], params));
                }
            }
            index.insert(id, trackers[id].prediction().position);
        }
    }

    let mut holders = vec![Vec::new(); observations.len()];
    for (id, tracker) in trackers.iter().enumerate() {
        if let Some(candidate) = tracker.candidate() {
            holders[candidate.index].push(id);
        }
    }
    outcome.merged = holders
        .iter()
        .map(|ids| ids.len() > 1 && bands_disjoint(trackers, ids))
        .collect();

    outcome
}
