//! One-euro filter estimator
//!
//! Each component runs through an adaptive low-pass filter whose cutoff
//! grows with the filtered speed of the signal: slow strokes are smoothed
//! hard, fast moving ones follow their observations closely. Time is
//! measured in scanlines.

use super::{Estimate, Prediction};
use crate::history::History;
use crate::observation::Observation;
use std::f32::consts::PI;

fn smoothing_factor(elapsed: f32, cutoff: f32) -> f32 {
    let tau = 1.0 / (2.0 * PI * cutoff);
    1.0 / (1.0 + tau / elapsed)
}

#[derive(Debug, Clone, Copy)]
struct Filter {
    value: f32,
    derivative: f32,
}

impl Filter {
    fn new(value: f32) -> Self {
        Self {
            value,
            derivative: 0.0,
        }
    }

    fn update(&mut self, x: f32, elapsed: f32, min_cutoff: f32, beta: f32, derivative_cutoff: f32) {
        let raw = (x - self.value) / elapsed;
        let a_d = smoothing_factor(elapsed, derivative_cutoff);
        self.derivative = a_d * raw + (1.0 - a_d) * self.derivative;
        let cutoff = min_cutoff + beta * self.derivative.abs();
        let a = smoothing_factor(elapsed, cutoff);
        self.value = a * x + (1.0 - a) * self.value;
    }
}

/// One-euro estimator
#[derive(Debug, Clone)]
pub struct OneEuro {
    min_cutoff: f32,
    beta: f32,
    derivative_cutoff: f32,
    position: Filter,
    thickness: Filter,
    luminosity: Filter,
    last_t: u32,
}

impl OneEuro {
    pub fn new(
        observation: &Observation,
        t: u32,
        min_cutoff: f32,
        beta: f32,
        derivative_cutoff: f32,
    ) -> Self {
        Self {
            min_cutoff,
            beta,
            derivative_cutoff,
            position: Filter::new(observation.position),
            thickness: Filter::new(observation.thickness),
            luminosity: Filter::new(observation.luminosity),
            last_t: t,
        }
    }
}

impl Estimate for OneEuro {
    fn predict(&mut self, _history: &History, t: u32) -> Prediction {
        let dt = t.saturating_sub(self.last_t) as f32;
        Prediction {
            position: self.position.value + self.position.derivative * dt,
            thickness: self.thickness.value,
            luminosity: self.luminosity.value,
        }
    }

    fn integrate(&mut self, observation: &Observation, t: u32) {
        let elapsed = t.saturating_sub(self.last_t).max(1) as f32;
        let (min_cutoff, beta, d_cutoff) = (self.min_cutoff, self.beta, self.derivative_cutoff);
        self.position
            .update(observation.position, elapsed, min_cutoff, beta, d_cutoff);
        self.thickness
            .update(observation.thickness, elapsed, min_cutoff, beta, d_cutoff);
        self.luminosity
            .update(observation.luminosity, elapsed, min_cutoff, beta, d_cutoff);
        self.last_t = t;
    }
}
