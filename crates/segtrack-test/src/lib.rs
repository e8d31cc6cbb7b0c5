//! segtrack-test - Regression test harness for segtrack
//!
//! This crate provides the regression checks shared by the integration
//! tests of every segtrack crate, together with a [`Canvas`] that paints
//! synthetic strokes so tests describe their input geometrically.
//!
//! # Usage
//!
//! ```ignore
//! use segtrack_test::{Canvas, RegParams};
//!
//! let image = Canvas::new(64, 64).vertical_stroke(30, 3, 0, 63).build();
//! let mut rp = RegParams::new("traversal");
//! rp.compare_values(1.0, segments.len() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```

mod canvas;
mod params;

pub use canvas::{BLACK, Canvas, WHITE};
pub use params::{Failure, RegParams};
