//! Segment linking
//!
//! A stroke interrupted by an occlusion longer than the tracker tolerates
//! comes out of the sweep as several fragments. Linking joins a fragment
//! to one starting shortly after it ends, provided the two slopes agree.
//!
//! # Algorithm Overview
//!
//! 1. The cost of appending `b` to `a` is the distance from the last span
//!    of `a` to the first span of `b`. It is undefined when `b` does not
//!    start after `a` ends or when the slopes at the junction differ by
//!    more than `merge_slope_variation`.
//! 2. Segments are sorted by first scanline. The followers of `a` are the
//!    segments starting less than `merge_distance_max` scanlines after its
//!    end, since the cost is never smaller than the scanline gap. Every
//!    qualifying pair goes into a min-heap.
//! 3. The globally cheapest pair is merged, `a` absorbing `b`. Pairs made
//!    stale by the merge are skipped when popped, and the pairs of the
//!    grown `a` are pushed again.
//! 4. Repeat until the heap is empty.

use segtrack_core::{SegDetParams, Segment};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Cost of appending `b` to `a`
///
/// # Returns
///
/// `None` when the pair cannot be linked whatever the distance.
pub fn link_cost(a: &Segment, b: &Segment, params: &SegDetParams) -> Option<f32> {
    if a.orientation != b.orientation || b.first_span.t <= a.last_span.t {
        return None;
    }
    if (a.last_part_slope - b.first_part_slope).abs() > params.merge_slope_variation {
        return None;
    }
    Some(a.last_span.distance(&b.first_span))
}

/// Candidate merge of `next` into `head`
#[derive(Debug, Clone, Copy)]
struct Link {
    cost: f32,
    head: usize,
    next: usize,
    /// Merges `head` had gone through when the cost was computed
    version: usize,
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Link {}

impl PartialOrd for Link {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Link {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.head.cmp(&other.head))
            .then(self.next.cmp(&other.next))
    }
}

/// Push the qualifying links starting from `head`
///
/// `by_start` holds `(first scanline, handle)` pairs in ascending order.
fn push_links(
    slots: &[Option<Segment>],
    by_start: &[(u32, usize)],
    head: usize,
    version: usize,
    params: &SegDetParams,
    heap: &mut BinaryHeap<Reverse<Link>>,
) {
    let Some(a) = &slots[head] else {
        return;
    };
    let end = a.last_span.t;
    let from = by_start.partition_point(|&(t, _)| t <= end);
    for &(t, next) in &by_start[from..] {
        if (t - end) as f32 >= params.merge_distance_max {
            break;
        }
        let Some(b) = &slots[next] else {
            continue;
        };
        if let Some(cost) =
            link_cost(a, b, params).filter(|&cost| cost < params.merge_distance_max)
        {
            heap.push(Reverse(Link {
                cost,
                head,
                next,
                version,
            }));
        }
    }
}

/// Link the segments of one orientation in place
///
/// The absorbing segment keeps its place in the list. On equal cost the
/// pair whose absorbing segment comes first in the list wins.
///
/// # Returns
///
/// The number of merges performed.
pub fn link_segments(segments: &mut Vec<Segment>, params: &SegDetParams) -> usize {
    let mut slots: Vec<Option<Segment>> = segments.drain(..).map(Some).collect();
    let mut by_start: Vec<(u32, usize)> = slots
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.as_ref().map(|s| (s.first_span.t, i)))
        .collect();
    by_start.sort_unstable();

    let mut versions = vec![0usize; slots.len()];
    let mut heap = BinaryHeap::new();
    for head in 0..slots.len() {
        push_links(&slots, &by_start, head, 0, params, &mut heap);
    }

    let mut linked = 0;
    while let Some(Reverse(link)) = heap.pop() {
        if link.version != versions[link.head] || slots[link.head].is_none() {
            continue;
        }
        let Some(next) = slots[link.next].take() else {
            continue;
        };
        if let Some(head) = slots[link.head].as_mut() {
            head.absorb(next);
        }
        versions[link.head] += 1;
        linked += 1;
        push_links(
            &slots,
            &by_start,
            link.head,
            versions[link.head],
            params,
            &mut heap,
        );
    }

    segments.extend(slots.into_iter().flatten());
    linked
}
