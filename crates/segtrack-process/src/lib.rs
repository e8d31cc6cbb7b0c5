//! segtrack-process - Scanline tracking sweeps
//!
//! This crate turns a grayscale image into raw line segments by sweeping
//! it scanline by scanline and following every stroke with a tracker:
//!
//! - [`observation`]: runs observed on a scanline
//! - [`estimator`]: prediction strategies of a tracker
//! - [`tracker`]: per-stroke state, gating and adaptive sigmas
//! - [`bucket`]: spatial index of trackers
//! - [`matching`]: observation to tracker assignment
//! - [`fusion`]: removal of trackers following the same stroke
//! - [`lifecycle`]: continuation and termination of trackers
//! - [`traversal`]: the sweep loops
//!
//! Segments produced here are not yet linked, deduplicated or filtered by
//! length; see `segtrack-postprocess`.

pub mod bucket;
pub mod estimator;
pub mod fusion;
pub mod history;
pub mod lifecycle;
pub mod matching;
pub mod observation;
pub mod tracker;
pub mod traversal;

pub use bucket::BucketIndex;
pub use estimator::{Estimate, Estimator, Prediction};
pub use history::{History, Sample};
pub use matching::{MatchOutcome, Reach, accepting_trackers, match_observations};
pub use observation::{Observation, extract_observations};
pub use tracker::{Sigmas, Tracker, gate};
pub use traversal::{
    Sweeps, Traversal, TraversalStats, process, traverse, traverse_horizontal, traverse_vertical,
};
