//! Per-stroke tracker
//!
//! A tracker follows one stroke across scanlines. Each scanline it is
//! asked to predict, may be offered observations that pass its gate, keeps
//! the nearest one and integrates it. When nothing matched it may survive
//! under occlusion for a while before being terminated into a [`Segment`].
//!
//! # Gating
//!
//! An observation is accepted when every component lies within three
//! adaptive sigmas of the prediction. Sigmas are the configured defaults
//! until the history holds more than `min_nb_values_sigma` samples, then
//! `std(position) + floor`, `2 * std(thickness) + floor` and
//! `std(luminosity) + floor`. A long-lived tracker also refuses
//! observations much thicker than predicted, and in binary mode the pixel
//! bands must overlap.

use crate::estimator::{Estimate, Estimator, Prediction};
use crate::history::{History, Sample};
use crate::observation::Observation;
use segtrack_core::{ExtractionMode, Orientation, SegDetParams, Segment, Span, slope_to_angle};

/// Samples needed before the early-stop slope test applies
pub const SLOPE_MIN_SAMPLES: usize = 10;

/// Shortest tracked extent (in scanlines) allowed to survive a miss
pub const ISOLATED_EXTENT: u32 = 2;

/// Gating half-widths are three times these
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sigmas {
    pub position: f32,
    pub thickness: f32,
    pub luminosity: f32,
}

impl Sigmas {
    pub fn defaults(params: &SegDetParams) -> Self {
        Self {
            position: params.default_sigma_position,
            thickness: params.default_sigma_thickness,
            luminosity: params.default_sigma_luminosity,
        }
    }
}

/// Nearest accepted observation of the current scanline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index of the observation on its scanline
    pub index: usize,
    /// Distance between observed and predicted position
    pub distance: f32,
}

/// Outcome of offering an observation to a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// The observation became the candidate, replacing `displaced` if any
    Taken { displaced: Option<usize> },
    /// The tracker already holds a nearer (or equally near) observation
    Refused,
}

/// Pixel band of a prediction, `position ± trunc(thickness / 2)`
pub fn prediction_band(prediction: &Prediction) -> (f32, f32) {
    let half = (prediction.thickness / 2.0).trunc();
    (prediction.position - half, prediction.position + half)
}

/// Gate an observation against a prediction
///
/// # Arguments
///
/// * `prediction` - Predicted state of the tracker
/// * `sigmas` - Current adaptive sigmas of the tracker
/// * `history_len` - Number of samples in the tracker's history
/// * `observation` - Candidate observation
/// * `params` - Detector configuration
pub fn gate(
    prediction: &Prediction,
    sigmas: &Sigmas,
    history_len: usize,
    observation: &Observation,
    params: &SegDetParams,
) -> bool {
    let thickness_gap = (observation.thickness - prediction.thickness).abs();
    if history_len > params.min_nb_values_sigma
        && observation.thickness / prediction.thickness > 1.5
        && thickness_gap > 3.0
    {
        return false;
    }

    if params.extraction_mode == ExtractionMode::Binary {
        let (band_min, band_max) = prediction_band(prediction);
        let (obs_min, obs_max) = observation.band();
        if band_max < obs_min || obs_max < band_min {
            return false;
        }
    }

    (observation.position - prediction.position).abs() <= 3.0 * sigmas.position
        && thickness_gap <= 3.0 * sigmas.thickness
        && (observation.luminosity - prediction.luminosity).abs() <= 3.0 * sigmas.luminosity
}

/// Tracker of one stroke hypothesis
#[derive(Debug, Clone)]
pub struct Tracker {
    first_t: u32,
    last_integration_t: u32,
    history: History,
    /// Spans evicted from the history
    pending: Vec<Span>,
    occluded: Vec<Span>,
    last_crossing_t: Option<u32>,
    /// Consecutive merged observations followed without learning
    merged_run: usize,
    slope: f32,
    first_slope: Option<f32>,
    sigmas: Sigmas,
    prediction: Prediction,
    estimator: Estimator,
    candidate: Option<Candidate>,
}

impl Tracker {
    /// Spawn a tracker from an unmatched observation on scanline `t`
    pub fn new(t: u32, observation: &Observation, params: &SegDetParams) -> Self {
        let mut history = History::new(params.nb_values_to_keep);
        history.push(sample(t, observation));
        Self {
            first_t: t,
            last_integration_t: t,
            history,
            pending: Vec::new(),
            occluded: Vec::new(),
            last_crossing_t: None,
            merged_run: 0,
            slope: 0.0,
            first_slope: None,
            sigmas: Sigmas::defaults(params),
            prediction: Prediction {
                position: observation.position,
                thickness: observation.thickness,
                luminosity: observation.luminosity,
            },
            estimator: Estimator::new(params.tracker, observation, t, params),
            candidate: None,
        }
    }

    pub fn first_t(&self) -> u32 {
        self.first_t
    }

    pub fn last_integration_t(&self) -> u32 {
        self.last_integration_t
    }

    /// Scanlines between the first and the last integration
    pub fn extent(&self) -> u32 {
        self.last_integration_t - self.first_t
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn prediction(&self) -> &Prediction {
        &self.prediction
    }

    pub fn sigmas(&self) -> &Sigmas {
        &self.sigmas
    }

    pub fn slope(&self) -> f32 {
        self.slope
    }

    pub fn candidate(&self) -> Option<Candidate> {
        self.candidate
    }

    pub fn occluded_spans(&self) -> &[Span] {
        &self.occluded
    }

    /// Predict the state on scanline `t` and forget the previous candidate
    pub fn predict(&mut self, t: u32) {
        self.prediction = self.estimator.predict(&self.history, t);
        self.candidate = None;
    }

    /// Pixel band of the current prediction
    pub fn band(&self) -> (f32, f32) {
        prediction_band(&self.prediction)
    }

    /// Whether `observation` passes this tracker's gate
    pub fn accepts(&self, observation: &Observation, params: &SegDetParams) -> bool {
        gate(
            &self.prediction,
            &self.sigmas,
            self.history.len(),
            observation,
            params,
        )
    }

    /// Offer an accepted observation; the nearest one is kept
    pub fn offer(&mut self, index: usize, observation: &Observation) -> Offer {
        let distance = (observation.position - self.prediction.position).abs();
        match self.candidate {
            Some(current) if distance >= current.distance => Offer::Refused,
            previous => {
                self.candidate = Some(Candidate { index, distance });
                Offer::Taken {
                    displaced: previous.map(|c| c.index),
                }
            }
        }
    }

    /// Integrate the observation kept on scanline `t`
    pub fn integrate(&mut self, observation: &Observation, t: u32, params: &SegDetParams) {
        self.merged_run = 0;
        self.learn(observation, t, params);
    }

    fn learn(&mut self, observation: &Observation, t: u32, params: &SegDetParams) {
        // A crossing noted earlier on this scanline is superseded
        if self.occluded.last().is_some_and(|s| s.t == t) {
            self.occluded.pop();
        }

        self.estimator.integrate(observation, t);
        let evicted = self.history.push(sample(t, observation));
        self.slope = self.history.slope();
        if let Some(old) = evicted {
            self.pending.push(Span::new(
                old.t,
                old.position,
                old.thickness,
                slope_to_angle(self.slope),
            ));
        }
        if self.first_slope.is_none() && self.history.len() >= self.history.capacity() {
            self.first_slope = Some(self.slope);
        }

        self.sigmas = if self.history.len() > params.min_nb_values_sigma {
            let spread = self.history.spread();
            Sigmas {
                position: spread.position + params.sigma_position_min,
                thickness: 2.0 * spread.thickness + params.sigma_thickness_min,
                luminosity: spread.luminosity + params.sigma_luminosity_min,
            }
        } else {
            Sigmas::defaults(params)
        };

        self.last_integration_t = t;
    }

    /// Record the part of `observation` the predicted band passes under
    ///
    /// Returns `true` when a crossing span was recorded.
    pub fn record_crossing(&mut self, observation: &Observation, t: u32) -> bool {
        let obs_half = observation.thickness / 2.0;
        let own_half = self.prediction.thickness / 2.0;
        let lo = (observation.position - obs_half).max(self.prediction.position - own_half);
        let hi = (observation.position + obs_half).min(self.prediction.position + own_half);
        let thickness = (hi - lo).round();
        if thickness <= 0.0 {
            return false;
        }
        if self.occluded.last().is_some_and(|s| s.t == t) {
            self.occluded.pop();
        }
        self.occluded.push(Span::new(
            t,
            ((lo + hi) / 2.0).round(),
            thickness,
            slope_to_angle(self.slope),
        ));
        self.last_crossing_t = Some(t);
        true
    }

    /// Follow an observation merging this stroke with another one
    ///
    /// The observation is recorded as an occluded span on scanline `t` and
    /// the tracker survives as if passing under it. The history, estimator
    /// and sigmas are left untouched, so the tracker keeps the trajectory
    /// it had before the merge. A merge lasting more than
    /// `minimum_for_fusion` scanlines is integrated again, letting fusion
    /// settle strokes that really joined.
    pub fn follow_merged(&mut self, observation: &Observation, t: u32, params: &SegDetParams) {
        self.merged_run += 1;
        if self.merged_run > params.minimum_for_fusion {
            self.learn(observation, t, params);
            return;
        }
        if self.record_crossing(observation, t) || self.crossing_at(t) {
            return;
        }
        self.record_gap(t);
        self.last_crossing_t = Some(t);
    }

    /// Whether the tracker passes under an observation on scanline `t`
    pub fn crossing_at(&self, t: u32) -> bool {
        self.last_crossing_t == Some(t)
    }

    /// Record the predicted span of a tolerated miss on scanline `t`
    pub fn record_gap(&mut self, t: u32) {
        self.occluded.push(Span::new(
            t,
            self.prediction.position,
            self.prediction.thickness,
            slope_to_angle(self.slope),
        ));
    }

    /// Whether an unmatched tracker survives scanline `t`
    pub fn should_continue(&self, t: u32, params: &SegDetParams) -> bool {
        if self.extent() <= ISOLATED_EXTENT {
            return false;
        }
        if self.crossing_at(t) {
            return true;
        }
        let reference = self
            .last_crossing_t
            .map_or(self.last_integration_t, |c| c.max(self.last_integration_t));
        let tolerance = params.discontinuity_relative * self.extent() as f32
            + params.discontinuity_absolute as f32;
        t.saturating_sub(reference) as f32 <= tolerance
    }

    /// Whether the tracker drifted past the early-stop slope
    pub fn exceeds_slope(&self, params: &SegDetParams) -> bool {
        self.history.len() > SLOPE_MIN_SAMPLES
            && self.slope.abs() > params.max_slope.to_radians().tan()
    }

    /// Whether the last `n` samples of both trackers coincide
    pub fn shares_tail(&self, other: &Tracker, n: usize) -> bool {
        match (self.history.tail(n), other.history.tail(n)) {
            (Some(a), Some(b)) => a.zip(b).all(|(x, y)| {
                x.t == y.t && x.position == y.position && x.thickness == y.thickness
            }),
            _ => false,
        }
    }

    /// Terminate the tracker into a segment
    ///
    /// The newest `drop_last` samples are left out. Occluded spans beyond
    /// the last kept sample are dropped. Returns `None` when nothing is
    /// left.
    pub fn into_segment(mut self, orientation: Orientation, drop_last: usize) -> Option<Segment> {
        let angle = slope_to_angle(self.slope);
        let mut samples = self.history.drain();
        samples.truncate(samples.len().saturating_sub(drop_last));

        let mut spans = self.pending;
        spans.extend(
            samples
                .iter()
                .map(|s| Span::new(s.t, s.position, s.thickness, angle)),
        );
        let last_t = spans.last()?.t;
        self.occluded.retain(|s| s.t < last_t);

        Segment::new(
            spans,
            self.occluded,
            orientation,
            self.first_slope.unwrap_or(self.slope),
            self.slope,
        )
    }
}

fn sample(t: u32, observation: &Observation) -> Sample {
    Sample {
        t,
        position: observation.position,
        thickness: observation.thickness,
        luminosity: observation.luminosity,
    }
}
