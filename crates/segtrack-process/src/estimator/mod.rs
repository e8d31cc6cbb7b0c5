//! Tracker state estimators
//!
//! Every tracker of a run owns one [`Estimator`], chosen once from
//! [`TrackerStrategy`]. An estimator predicts the (position, thickness,
//! luminosity) of its stroke on an upcoming scanline and absorbs the
//! observations the tracker integrates. Gating, history and sigma
//! bookkeeping are common to all strategies and live in the tracker.
//!
//! Predictions are made for an arbitrary scanline `t`, not only the next
//! one: a tracker that skipped scanlines under occlusion extrapolates over
//! the whole gap without its state having been touched in between.

mod double_exponential;
mod kalman;
mod moving_average;
mod one_euro;

pub use double_exponential::DoubleExponential;
pub use kalman::Kalman;
pub use moving_average::{ExponentialMovingAverage, SimpleMovingAverage};
pub use one_euro::OneEuro;

use crate::history::History;
use crate::observation::Observation;
use segtrack_core::{SegDetParams, TrackerStrategy};

/// Predicted state of a stroke on a scanline
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Prediction {
    pub position: f32,
    pub thickness: f32,
    pub luminosity: f32,
}

/// Common interface of the estimator strategies
pub trait Estimate {
    /// Predict the state on scanline `t`
    ///
    /// `history` holds the integrated samples, most recent last.
    fn predict(&mut self, history: &History, t: u32) -> Prediction;

    /// Absorb the observation integrated on scanline `t`
    fn integrate(&mut self, observation: &Observation, t: u32);
}

/// Repeats the last integrated sample
#[derive(Debug, Clone, Default)]
pub struct LastIntegration;

impl Estimate for LastIntegration {
    fn predict(&mut self, history: &History, _t: u32) -> Prediction {
        history.last().map_or_else(Prediction::default, |s| Prediction {
            position: s.position,
            thickness: s.thickness,
            luminosity: s.luminosity,
        })
    }

    fn integrate(&mut self, _observation: &Observation, _t: u32) {}
}

/// Least-squares extrapolation of the position over the history
#[derive(Debug, Clone, Default)]
pub struct Regression;

impl Estimate for Regression {
    fn predict(&mut self, history: &History, t: u32) -> Prediction {
        let Some(last) = history.last() else {
            return Prediction::default();
        };
        let position = history
            .regression()
            .map_or(last.position, |(slope, intercept)| {
                slope * t as f32 + intercept
            });
        Prediction {
            position,
            thickness: last.thickness,
            luminosity: last.luminosity,
        }
    }

    fn integrate(&mut self, _observation: &Observation, _t: u32) {}
}

/// Estimator of one tracker
#[derive(Debug, Clone)]
pub enum Estimator {
    LastIntegration(LastIntegration),
    Regression(Regression),
    SimpleMovingAverage(SimpleMovingAverage),
    ExponentialMovingAverage(ExponentialMovingAverage),
    DoubleExponential(DoubleExponential),
    OneEuro(OneEuro),
    Kalman(Kalman),
}

impl Estimator {
    /// Create the estimator of a tracker spawned from `observation` at `t`
    pub fn new(
        strategy: TrackerStrategy,
        observation: &Observation,
        t: u32,
        params: &SegDetParams,
    ) -> Self {
        match strategy {
            TrackerStrategy::LastIntegration => Estimator::LastIntegration(LastIntegration),
            TrackerStrategy::Regression => Estimator::Regression(Regression),
            TrackerStrategy::SimpleMovingAverage => Estimator::SimpleMovingAverage(
                SimpleMovingAverage::new(observation, t, params.simple_moving_average_memory),
            ),
            TrackerStrategy::ExponentialMovingAverage => {
                Estimator::ExponentialMovingAverage(ExponentialMovingAverage::new(
                    observation,
                    t,
                    params.exponential_moving_average_memory,
                ))
            }
            TrackerStrategy::DoubleExponential => Estimator::DoubleExponential(
                DoubleExponential::new(observation, t, params.double_exponential_alpha),
            ),
            TrackerStrategy::OneEuro => Estimator::OneEuro(OneEuro::new(
                observation,
                t,
                params.one_euro_min_cutoff,
                params.one_euro_beta,
                params.one_euro_derivative_cutoff,
            )),
            TrackerStrategy::Kalman => Estimator::Kalman(Kalman::new(observation, t)),
        }
    }

    pub fn strategy(&self) -> TrackerStrategy {
        match self {
            Estimator::LastIntegration(_) => TrackerStrategy::LastIntegration,
            Estimator::Regression(_) => TrackerStrategy::Regression,
            Estimator::SimpleMovingAverage(_) => TrackerStrategy::SimpleMovingAverage,
            Estimator::ExponentialMovingAverage(_) => TrackerStrategy::ExponentialMovingAverage,
            Estimator::DoubleExponential(_) => TrackerStrategy::DoubleExponential,
            Estimator::OneEuro(_) => TrackerStrategy::OneEuro,
            Estimator::Kalman(_) => TrackerStrategy::Kalman,
        }
    }

    fn inner(&mut self) -> &mut dyn Estimate {
        match self {
            Estimator::LastIntegration(e) => e,
            Estimator::Regression(e) => e,
            Estimator::SimpleMovingAverage(e) => e,
            Estimator::ExponentialMovingAverage(e) => e,
            Estimator::DoubleExponential(e) => e,
            Estimator::OneEuro(e) => e,
            Estimator::Kalman(e) => e,
        }
    }
}

impl Estimate for Estimator {
    fn predict(&mut self, history: &History, t: u32) -> Prediction {
        self.inner().predict(history, t)
    }

    fn integrate(&mut self, observation: &Observation, t: u32) {
        self.inner().integrate(observation, t)
    }
}
