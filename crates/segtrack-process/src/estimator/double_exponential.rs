//! Brown's double exponential smoothing
//!
//! Two cascaded exponential smoothers `s1` and `s2` per component give a
//! level `2 * s1 - s2` and a per-sample trend `alpha / (1 - alpha) * (s1 - s2)`.
//! The position is extrapolated along the trend; thickness and luminosity
//! use the level alone.

use super::{Estimate, Prediction};
use crate::history::History;
use crate::observation::Observation;

#[derive(Debug, Clone, Copy)]
struct Smoother {
    s1: f32,
    s2: f32,
}

impl Smoother {
    fn new(value: f32) -> Self {
        Self {
            s1: value,
            s2: value,
        }
    }

    fn update(&mut self, alpha: f32, value: f32) {
        self.s1 = alpha * value + (1.0 - alpha) * self.s1;
        self.s2 = alpha * self.s1 + (1.0 - alpha) * self.s2;
    }

    fn level(&self) -> f32 {
        2.0 * self.s1 - self.s2
    }

    fn trend(&self, alpha: f32) -> f32 {
        alpha / (1.0 - alpha) * (self.s1 - self.s2)
    }
}

/// Double exponential estimator
#[derive(Debug, Clone)]
pub struct DoubleExponential {
    alpha: f32,
    position: Smoother,
    thickness: Smoother,
    luminosity: Smoother,
    last_t: u32,
}

impl DoubleExponential {
    pub fn new(observation: &Observation, t: u32, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(f32::EPSILON, 1.0 - f32::EPSILON),
            position: Smoother::new(observation.position),
            thickness: Smoother::new(observation.thickness),
            luminosity: Smoother::new(observation.luminosity),
            last_t: t,
        }
    }
}

impl Estimate for DoubleExponential {
    fn predict(&mut self, _history: &History, t: u32) -> Prediction {
        let dt = t.saturating_sub(self.last_t) as f32;
        Prediction {
            position: self.position.level() + self.position.trend(self.alpha) * dt,
            thickness: self.thickness.level(),
            luminosity: self.luminosity.level(),
        }
    }

    fn integrate(&mut self, observation: &Observation, t: u32) {
        self.position.update(self.alpha, observation.position);
        self.thickness.update(self.alpha, observation.thickness);
        self.luminosity.update(self.alpha, observation.luminosity);
        self.last_t = t;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_prediction_is_observation() {
        let history = History::new(4);
        let mut de = DoubleExponential::new(&Observation::new(7.0, 2.0, 50.0), 3, 0.6);
        let p = de.predict(&history, 9);
        assert_eq!(p.position, 7.0);
        assert_eq!(p.thickness, 2.0);
        assert_eq!(p.luminosity, 50.0);
    }

    #[test]
    fn test_trend_sign() {
        let history = History::new(4);
        let mut de = DoubleExponential::new(&Observation::new(0.0, 2.0, 0.0), 0, 0.6);
        for t in 1..5 {
            de.integrate(&Observation::new(-(t as f32), 2.0, 0.0), t);
        }
        let p = de.predict(&history, 5);
        assert!(p.position < -4.0);
    }
}
