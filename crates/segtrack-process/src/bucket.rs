//! Spatial bucket index over trackers
//!
//! The cross-scanline axis `[0, n_max)` is cut into buckets of
//! `min(bucket_size, n_max)` positions. Trackers are filed by predicted
//! position so an observation only examines the trackers of the buckets
//! around it, one extra bucket on each side.
//!
//! The index stores tracker handles (indices into the sweep's tracker
//! arena), never the trackers themselves.

use std::ops::RangeInclusive;

/// Bucket index of tracker handles
#[derive(Debug, Clone)]
pub struct BucketIndex {
    bucket_size: usize,
    buckets: Vec<Vec<usize>>,
}

impl BucketIndex {
    /// Create an empty index
    ///
    /// # Arguments
    ///
    /// * `n_max` - Length of a scanline
    /// * `bucket_size` - Requested bucket width
    pub fn new(n_max: usize, bucket_size: usize) -> Self {
        let bucket_size = bucket_size.min(n_max).max(1);
        let count = n_max.div_ceil(bucket_size).max(1);
        Self {
            bucket_size,
            buckets: vec![Vec::new(); count],
        }
    }

    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket holding `position`; out-of-range positions clamp to the ends
    pub fn bucket_of(&self, position: f32) -> usize {
        if position.is_nan() || position <= 0.0 {
            return 0;
        }
        ((position / self.bucket_size as f32) as usize).min(self.buckets.len() - 1)
    }

    /// Buckets to examine for the position interval `[lo, hi]`
    pub fn bucket_range(&self, lo: f32, hi: f32) -> RangeInclusive<usize> {
        let first = self.bucket_of(lo).saturating_sub(1);
        let last = (self.bucket_of(hi) + 1).min(self.buckets.len() - 1);
        first..=last
    }

    /// File tracker `id` under `position`
    pub fn insert(&mut self, id: usize, position: f32) {
        let b = self.bucket_of(position);
        self.buckets[b].push(id);
    }

    /// Empty every bucket
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Refill the index from `(id, position)` pairs
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = (usize, f32)>) {
        self.clear();
        for (id, position) in entries {
            self.insert(id, position);
        }
    }

    /// Handles filed in bucket `b`
    pub fn bucket(&self, b: usize) -> &[usize] {
        &self.buckets[b]
    }

    /// Remove the handles of bucket `b` satisfying `pred`, returning them
    /// in filing order
    pub fn remove_matching(&mut self, b: usize, mut pred: impl FnMut(usize) -> bool) -> Vec<usize> {
        let mut removed = Vec::new();
        self.buckets[b].retain(|&id| {
            if pred(id) {
                removed.push(id);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Every handle filed in the buckets covering `[lo, hi]`
    pub fn query(&self, lo: f32, hi: f32) -> impl Iterator<Item = usize> + '_ {
        self.bucket_range(lo, hi)
            .flat_map(move |b| self.buckets[b].iter().copied())
    }

    /// Total number of filed handles
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
