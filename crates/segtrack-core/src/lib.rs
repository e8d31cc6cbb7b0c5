//! segtrack-core - Core data structures for the segtrack line detector
//!
//! This crate provides the types shared by the tracking sweeps and the
//! segment postprocessor:
//!
//! - [`GrayImage`]: 8-bit input raster
//! - [`LabelImage`]: 16-bit label raster used to measure overlaps
//! - [`Span`] and [`Orientation`]: committed trajectory samples
//! - [`Segment`]: a detected stroke
//! - [`SegDetParams`]: the detector configuration

pub mod error;
pub mod image;
pub mod params;
pub mod segment;
pub mod span;

pub use error::{Error, Result};
pub use image::{GrayImage, LabelImage};
pub use params::{ExtractionMode, SegDetParams, TrackerStrategy, TraversalMode};
pub use segment::Segment;
pub use span::{Orientation, Span, slope_to_angle};
