//! Detector configuration
//!
//! [`SegDetParams`] is the single scalar configuration record shared by the
//! sweeps and the postprocessor. It deserializes with serde, every missing
//! field falling back to its default, so it can be embedded in a larger
//! configuration file.

use crate::error::{Error, Result};
use crate::image::GrayImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Estimator used by every tracker of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TrackerStrategy {
    /// Repeat the last integrated observation
    LastIntegration,
    /// Least-squares extrapolation over the history
    Regression,
    /// Windowed mean slope, thickness and luminosity
    #[serde(rename = "moving_average")]
    SimpleMovingAverage,
    /// Exponentially smoothed slope, thickness and luminosity
    ExponentialMovingAverage,
    /// Brown's double exponential smoothing
    DoubleExponential,
    /// One-euro adaptive low-pass filter
    OneEuro,
    /// Constant-velocity Kalman filter
    #[default]
    Kalman,
}

impl TrackerStrategy {
    pub const ALL: [TrackerStrategy; 7] = [
        TrackerStrategy::LastIntegration,
        TrackerStrategy::Regression,
        TrackerStrategy::SimpleMovingAverage,
        TrackerStrategy::ExponentialMovingAverage,
        TrackerStrategy::DoubleExponential,
        TrackerStrategy::OneEuro,
        TrackerStrategy::Kalman,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TrackerStrategy::LastIntegration => "last_integration",
            TrackerStrategy::Regression => "regression",
            TrackerStrategy::SimpleMovingAverage => "moving_average",
            TrackerStrategy::ExponentialMovingAverage => "exponential_moving_average",
            TrackerStrategy::DoubleExponential => "double_exponential",
            TrackerStrategy::OneEuro => "one_euro",
            TrackerStrategy::Kalman => "kalman",
        }
    }
}

impl fmt::Display for TrackerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrackerStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_integration" => Ok(TrackerStrategy::LastIntegration),
            "regression" => Ok(TrackerStrategy::Regression),
            "moving_average" | "simple_moving_average" => Ok(TrackerStrategy::SimpleMovingAverage),
            "exponential_moving_average" => Ok(TrackerStrategy::ExponentialMovingAverage),
            "double_exponential" => Ok(TrackerStrategy::DoubleExponential),
            "one_euro" => Ok(TrackerStrategy::OneEuro),
            "kalman" => Ok(TrackerStrategy::Kalman),
            _ => Err(Error::UnknownStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for TrackerStrategy {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// How observations are read out of a scanline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ExtractionMode {
    /// Dark runs below a luminosity threshold
    #[default]
    Binary,
    /// Runs of strong signed gradient
    Gradient,
}

impl FromStr for ExtractionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(ExtractionMode::Binary),
            "gradient" => Ok(ExtractionMode::Gradient),
            _ => Err(Error::UnknownExtractionMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for ExtractionMode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Which sweeps are run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TraversalMode {
    /// Column scanlines only, producing horizontal segments
    Horizontal,
    /// Row scanlines only, producing vertical segments
    Vertical,
    /// Both sweeps
    #[default]
    HorizontalVertical,
}

impl TraversalMode {
    pub fn horizontal(self) -> bool {
        matches!(
            self,
            TraversalMode::Horizontal | TraversalMode::HorizontalVertical
        )
    }

    pub fn vertical(self) -> bool {
        matches!(
            self,
            TraversalMode::Vertical | TraversalMode::HorizontalVertical
        )
    }
}

impl FromStr for TraversalMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(TraversalMode::Horizontal),
            "vertical" => Ok(TraversalMode::Vertical),
            "horizontal_vertical" | "both" => Ok(TraversalMode::HorizontalVertical),
            _ => Err(Error::UnknownTraversalMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for TraversalMode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Configuration of the segment detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegDetParams {
    /// Observation extraction mode (default: binary)
    pub extraction_mode: ExtractionMode,
    /// Estimator strategy (default: kalman)
    pub tracker: TrackerStrategy,
    /// Sweeps to run (default: both)
    pub traversal_mode: TraversalMode,
    /// Invert the image first, for light strokes on a dark background
    /// (default: false)
    pub negate_image: bool,

    /// A pixel below this value opens a run (default: 225)
    pub max_luminosity: u8,
    /// A run grows while pixels stay below this value (default: 225)
    pub max_max_luminosity: u8,
    /// Fraction of the run's dynamic range kept when trimming its ends (default: 1.0)
    pub ratio_luminosity: f32,
    /// Central difference opening a run in gradient mode (default: 30)
    pub gradient_threshold: i32,
    /// Observations at least this thick never spawn or match (default: 100)
    pub max_thickness: u32,

    /// Samples kept in a tracker's history (default: 30)
    pub nb_values_to_keep: usize,
    /// Gating sigma on position before enough samples exist (default: 2)
    pub default_sigma_position: f32,
    /// Gating sigma on thickness before enough samples exist (default: 2)
    pub default_sigma_thickness: f32,
    /// Gating sigma on luminosity before enough samples exist (default: 57)
    pub default_sigma_luminosity: f32,
    /// History length beyond which sigmas are measured (default: 10)
    pub min_nb_values_sigma: usize,
    /// Floor added to the measured position sigma (default: 1.0)
    pub sigma_position_min: f32,
    /// Floor added to the measured thickness sigma (default: 0.64)
    pub sigma_thickness_min: f32,
    /// Floor added to the measured luminosity sigma (default: 13)
    pub sigma_luminosity_min: f32,

    /// Gap tolerance proportional to the tracked length (default: 0)
    pub discontinuity_relative: f32,
    /// Constant gap tolerance in scanlines (default: 0)
    pub discontinuity_absolute: u32,
    /// Identical trailing samples needed to fuse two trackers (default: 15)
    pub minimum_for_fusion: usize,
    /// Trackers steeper than this angle in degrees are stopped (default: 50)
    pub max_slope: f32,

    /// Minimum length of a reported segment (default: 10)
    pub min_length: u32,
    /// Minimum length for a terminated tracker to become a segment
    /// (default: `min_length / 4 + 1`)
    pub min_length_embryo: Option<u32>,
    /// Width of a bucket of the tracker index (default: 32)
    pub bucket_size: usize,

    /// Largest end-to-start distance bridged by linking (default: 8)
    pub merge_distance_max: f32,
    /// Largest slope difference bridged by linking (default: 0.4)
    pub merge_slope_variation: f32,
    /// Overlap ratio above which a segment is a duplicate (default: 0.8)
    pub threshold_intersection: f32,
    /// Remove segments found by both sweeps (default: true)
    pub remove_duplicates: bool,

    /// Smoothing factor of the double exponential estimator (default: 0.6)
    pub double_exponential_alpha: f32,
    /// Window of the simple moving average estimator (default: 30)
    pub simple_moving_average_memory: usize,
    /// Span of the exponential moving average estimator (default: 30)
    pub exponential_moving_average_memory: usize,
    /// Minimum cutoff frequency of the one-euro estimator (default: 1.0)
    pub one_euro_min_cutoff: f32,
    /// Speed coefficient of the one-euro estimator (default: 0.007)
    pub one_euro_beta: f32,
    /// Derivative cutoff frequency of the one-euro estimator (default: 1.0)
    pub one_euro_derivative_cutoff: f32,
}

impl Default for SegDetParams {
    fn default() -> Self {
        Self {
            extraction_mode: ExtractionMode::Binary,
            tracker: TrackerStrategy::Kalman,
            traversal_mode: TraversalMode::HorizontalVertical,
            negate_image: false,
            max_luminosity: 225,
            max_max_luminosity: 225,
            ratio_luminosity: 1.0,
            gradient_threshold: 30,
            max_thickness: 100,
            nb_values_to_keep: 30,
            default_sigma_position: 2.0,
            default_sigma_thickness: 2.0,
            default_sigma_luminosity: 57.0,
            min_nb_values_sigma: 10,
            sigma_position_min: 1.0,
            sigma_thickness_min: 0.64,
            sigma_luminosity_min: 13.0,
            discontinuity_relative: 0.0,
            discontinuity_absolute: 0,
            minimum_for_fusion: 15,
            max_slope: 50.0,
            min_length: 10,
            min_length_embryo: None,
            bucket_size: 32,
            merge_distance_max: 8.0,
            merge_slope_variation: 0.4,
            threshold_intersection: 0.8,
            remove_duplicates: true,
            double_exponential_alpha: 0.6,
            simple_moving_average_memory: 30,
            exponential_moving_average_memory: 30,
            one_euro_min_cutoff: 1.0,
            one_euro_beta: 0.007,
            one_euro_derivative_cutoff: 1.0,
        }
    }
}

impl SegDetParams {
    /// Create new parameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the estimator strategy
    pub fn with_tracker(mut self, tracker: TrackerStrategy) -> Self {
        self.tracker = tracker;
        self
    }

    /// Set the extraction mode
    pub fn with_extraction_mode(mut self, mode: ExtractionMode) -> Self {
        self.extraction_mode = mode;
        self
    }

    /// Set the sweeps to run
    pub fn with_traversal_mode(mut self, mode: TraversalMode) -> Self {
        self.traversal_mode = mode;
        self
    }

    /// Set whether the image is inverted before the sweeps
    pub fn with_negate_image(mut self, negate: bool) -> Self {
        self.negate_image = negate;
        self
    }

    /// Set the luminosity threshold opening a run; the run ceiling follows
    pub fn with_max_luminosity(mut self, max_luminosity: u8) -> Self {
        self.max_luminosity = max_luminosity;
        self.max_max_luminosity = max_luminosity;
        self
    }

    /// Set the ceiling a run may grow under
    pub fn with_max_max_luminosity(mut self, ceiling: u8) -> Self {
        self.max_max_luminosity = ceiling;
        self
    }

    /// Set the trimming ratio
    pub fn with_ratio_luminosity(mut self, ratio: f32) -> Self {
        self.ratio_luminosity = ratio;
        self
    }

    /// Set the gradient threshold
    pub fn with_gradient_threshold(mut self, threshold: i32) -> Self {
        self.gradient_threshold = threshold;
        self
    }

    /// Set the maximum observation thickness
    pub fn with_max_thickness(mut self, max_thickness: u32) -> Self {
        self.max_thickness = max_thickness;
        self
    }

    /// Set the history length
    pub fn with_nb_values_to_keep(mut self, n: usize) -> Self {
        self.nb_values_to_keep = n;
        self
    }

    /// Set both gap tolerances
    pub fn with_discontinuity(mut self, relative: f32, absolute: u32) -> Self {
        self.discontinuity_relative = relative;
        self.discontinuity_absolute = absolute;
        self
    }

    /// Set the fusion window
    pub fn with_minimum_for_fusion(mut self, n: usize) -> Self {
        self.minimum_for_fusion = n;
        self
    }

    /// Set the early-stop slope in degrees
    pub fn with_max_slope(mut self, degrees: f32) -> Self {
        self.max_slope = degrees;
        self
    }

    /// Set the minimum reported segment length
    pub fn with_min_length(mut self, min_length: u32) -> Self {
        self.min_length = min_length;
        self
    }

    /// Override the embryo length derived from `min_length`
    pub fn with_min_length_embryo(mut self, embryo: u32) -> Self {
        self.min_length_embryo = Some(embryo);
        self
    }

    /// Set the bucket width of the tracker index
    pub fn with_bucket_size(mut self, size: usize) -> Self {
        self.bucket_size = size;
        self
    }

    /// Set the linking limits
    pub fn with_linking(mut self, distance_max: f32, slope_variation: f32) -> Self {
        self.merge_distance_max = distance_max;
        self.merge_slope_variation = slope_variation;
        self
    }

    /// Set the duplicate overlap threshold
    pub fn with_threshold_intersection(mut self, threshold: f32) -> Self {
        self.threshold_intersection = threshold;
        self
    }

    /// Enable or disable duplicate removal
    pub fn with_remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = remove;
        self
    }

    /// Minimum length for a terminated tracker to be kept as a segment
    pub fn embryo_length(&self) -> u32 {
        self.min_length_embryo
            .unwrap_or(self.min_length / 4 + 1)
    }

    /// Copy of these parameters with `max_thickness` scaled to the image
    ///
    /// Strokes may be as thick as 40% of the largest image dimension.
    pub fn adapted_to(&self, image: &GrayImage) -> Self {
        let max_dim = image.width().max(image.height()) as f32;
        Self {
            max_thickness: (max_dim * 0.4).ceil() as u32,
            ..self.clone()
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.bucket_size == 0 {
            return Err(Error::InvalidParameter(
                "bucket_size must be positive".to_string(),
            ));
        }
        if self.nb_values_to_keep < 2 {
            return Err(Error::InvalidParameter(
                "nb_values_to_keep must be at least 2".to_string(),
            ));
        }
        if self.minimum_for_fusion == 0 || self.minimum_for_fusion > self.nb_values_to_keep {
            return Err(Error::InvalidParameter(
                "minimum_for_fusion must be in 1..=nb_values_to_keep".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ratio_luminosity) {
            return Err(Error::InvalidParameter(
                "ratio_luminosity must be in [0, 1]".to_string(),
            ));
        }
        if self.max_max_luminosity < self.max_luminosity {
            return Err(Error::InvalidParameter(
                "max_max_luminosity must not be below max_luminosity".to_string(),
            ));
        }
        if self.gradient_threshold < 0 {
            return Err(Error::InvalidParameter(
                "gradient_threshold must not be negative".to_string(),
            ));
        }
        if self.sigma_position_min <= 0.0
            || self.sigma_thickness_min <= 0.0
            || self.sigma_luminosity_min <= 0.0
        {
            return Err(Error::InvalidParameter(
                "sigma floors must be positive".to_string(),
            ));
        }
        if self.default_sigma_position < self.sigma_position_min
            || self.default_sigma_thickness < self.sigma_thickness_min
            || self.default_sigma_luminosity < self.sigma_luminosity_min
        {
            return Err(Error::InvalidParameter(
                "default sigmas must not be below their floors".to_string(),
            ));
        }
        if self.discontinuity_relative < 0.0 {
            return Err(Error::InvalidParameter(
                "discontinuity_relative must not be negative".to_string(),
            ));
        }
        if !(self.max_slope > 0.0 && self.max_slope < 90.0) {
            return Err(Error::InvalidParameter(
                "max_slope must be in (0, 90) degrees".to_string(),
            ));
        }
        if !(self.threshold_intersection > 0.0 && self.threshold_intersection <= 1.0) {
            return Err(Error::InvalidParameter(
                "threshold_intersection must be in (0, 1]".to_string(),
            ));
        }
        if self.merge_distance_max < 0.0 || self.merge_slope_variation < 0.0 {
            return Err(Error::InvalidParameter(
                "linking limits must not be negative".to_string(),
            ));
        }
        if !(self.double_exponential_alpha > 0.0 && self.double_exponential_alpha < 1.0) {
            return Err(Error::InvalidParameter(
                "double_exponential_alpha must be in (0, 1)".to_string(),
            ));
        }
        if self.simple_moving_average_memory == 0 || self.exponential_moving_average_memory == 0
        {
            return Err(Error::InvalidParameter(
                "moving average memories must be positive".to_string(),
            ));
        }
        if self.one_euro_min_cutoff <= 0.0 || self.one_euro_derivative_cutoff <= 0.0 {
            return Err(Error::InvalidParameter(
                "one-euro cutoffs must be positive".to_string(),
            ));
        }
        if self.one_euro_beta < 0.0 {
            return Err(Error::InvalidParameter(
                "one_euro_beta must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let params = SegDetParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.embryo_length(), 3);
        assert_eq!(params.with_min_length(40).embryo_length(), 11);
    }

    #[test]
    fn test_strategy_from_str() {
        for strategy in TrackerStrategy::ALL {
            assert_eq!(strategy.name().parse::<TrackerStrategy>(), Ok(strategy));
        }
        assert_eq!(
            "simple_moving_average".parse::<TrackerStrategy>(),
            Ok(TrackerStrategy::SimpleMovingAverage)
        );
        let err = "particle_filter".parse::<TrackerStrategy>().unwrap_err();
        assert_eq!(err, Error::UnknownStrategy("particle_filter".to_string()));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_modes_from_str() {
        assert_eq!(
            "both".parse::<TraversalMode>(),
            Ok(TraversalMode::HorizontalVertical)
        );
        assert_eq!(
            "Gradient".parse::<ExtractionMode>(),
            Ok(ExtractionMode::Gradient)
        );
        assert!("diagonal".parse::<TraversalMode>().is_err());
        assert!(TraversalMode::Vertical.vertical());
        assert!(!TraversalMode::Vertical.horizontal());
    }

    #[test]
    fn test_deserialize_partial() {
        let params: SegDetParams =
            serde_json::from_str(r#"{"tracker": "one_euro", "min_length": 40}"#).unwrap();
        assert_eq!(params.tracker, TrackerStrategy::OneEuro);
        assert_eq!(params.min_length, 40);
        assert_eq!(params.bucket_size, 32);
    }

    #[test]
    fn test_deserialize_unknown_strategy() {
        let err = serde_json::from_str::<SegDetParams>(r#"{"tracker": "particle_filter"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown tracker strategy"));
    }

    #[test]
    fn test_serialize_roundtrip_names() {
        let params = SegDetParams::new().with_tracker(TrackerStrategy::SimpleMovingAverage);
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains(r#""tracker":"moving_average""#));
        let back: SegDetParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_validate_rejects() {
        assert!(SegDetParams::new().with_bucket_size(0).validate().is_err());
        assert!(
            SegDetParams::new()
                .with_minimum_for_fusion(31)
                .validate()
                .is_err()
        );
        assert!(SegDetParams::new().with_max_slope(90.0).validate().is_err());
        assert!(
            SegDetParams::new()
                .with_ratio_luminosity(1.5)
                .validate()
                .is_err()
        );
        assert!(
            SegDetParams::new()
                .with_max_luminosity(200)
                .with_max_max_luminosity(100)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_adapted_to() {
        let image = GrayImage::new(100, 250, 255);
        assert_eq!(SegDetParams::new().adapted_to(&image).max_thickness, 100);
        let image = GrayImage::new(10, 12, 255);
        assert_eq!(SegDetParams::new().adapted_to(&image).max_thickness, 5);
    }
}
