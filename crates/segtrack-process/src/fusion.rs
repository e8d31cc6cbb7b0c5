//! Fusion of trackers following the same stroke
//!
//! When several trackers keep integrating the very same observations they
//! have converged onto one stroke. After `minimum_for_fusion` identical
//! trailing samples the younger tracker is dropped. Whatever it tracked
//! before joining may still be worth a segment, without the shared tail.

use crate::tracker::Tracker;
use log::trace;
use segtrack_core::{Orientation, SegDetParams, Segment};

/// Result of a fusion pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Fusion {
    /// Trackers removed from the population
    pub fused: usize,
    /// Segments emitted from removed trackers
    pub emitted: usize,
}

/// Remove trackers duplicating an older one
///
/// Only trackers holding a candidate observation take part. Of two
/// trackers whose last `minimum_for_fusion` samples coincide in scanline,
/// position and thickness, the one started later is removed (the earlier
/// in arena order on a tie). After a pass no two remaining candidates
/// share their tail.
///
/// # Arguments
///
/// * `trackers` - Tracker arena, modified in place
/// * `orientation` - Orientation of the sweep
/// * `params` - Detector configuration
/// * `segments` - Receives the segments of removed trackers
pub fn fuse_trackers(
    trackers: &mut Vec<Tracker>,
    orientation: Orientation,
    params: &SegDetParams,
    segments: &mut Vec<Segment>,
) -> Fusion {
    let window = params.minimum_for_fusion;
    let embryo = params.embryo_length() as usize;
    let mut result = Fusion::default();

    let mut i = 0;
    while i < trackers.len() {
        if trackers[i].candidate().is_none() {
            i += 1;
            continue;
        }

        let mut current_removed = false;
        let mut j = i + 1;
        while j < trackers.len() {
            if trackers[j].candidate().is_none() || !trackers[i].shares_tail(&trackers[j], window) {
                j += 1;
                continue;
            }

            let victim = if trackers[i].first_t() < trackers[j].first_t() {
                j
            } else {
                i
            };
            let removed = trackers.remove(victim);
            trace!(
                "fused tracker started at t={} ({}..={})",
                removed.first_t(),
                removed.first_t(),
                removed.last_integration_t()
            );
            result.fused += 1;
            if (removed.extent() as usize).saturating_sub(window) > embryo {
                if let Some(segment) = removed.into_segment(orientation, window) {
                    segments.push(segment);
                    result.emitted += 1;
                }
            }
            if victim == i {
                current_removed = true;
                break;
            }
        }

        if !current_removed {
            i += 1;
        }
    }

    result
}
