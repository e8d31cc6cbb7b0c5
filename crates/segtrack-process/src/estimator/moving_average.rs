//! Moving average estimators
//!
//! Both variants predict the position as the last observed position plus a
//! smoothed per-scanline slope, and thickness and luminosity as smoothed
//! values. They only differ in the smoothing: a window mean for the simple
//! average, an exponential decay with `alpha = 2 / (memory + 1)` for the
//! exponential one.

use super::{Estimate, Prediction};
use crate::history::History;
use crate::observation::Observation;
use std::collections::VecDeque;

/// Window mean of slope, thickness and luminosity
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    memory: usize,
    slopes: VecDeque<f32>,
    thicknesses: VecDeque<f32>,
    luminosities: VecDeque<f32>,
    last_t: u32,
    last_position: f32,
}

fn push_bounded(window: &mut VecDeque<f32>, value: f32, memory: usize) {
    window.push_back(value);
    while window.len() > memory {
        window.pop_front();
    }
}

fn mean(window: &VecDeque<f32>) -> f32 {
    if window.is_empty() {
        0.0
    } else {
        window.iter().sum::<f32>() / window.len() as f32
    }
}

impl SimpleMovingAverage {
    pub fn new(observation: &Observation, t: u32, memory: usize) -> Self {
        let memory = memory.max(1);
        let mut sma = Self {
            memory,
            slopes: VecDeque::with_capacity(memory + 1),
            thicknesses: VecDeque::with_capacity(memory + 1),
            luminosities: VecDeque::with_capacity(memory + 1),
            last_t: t,
            last_position: observation.position,
        };
        push_bounded(&mut sma.thicknesses, observation.thickness, memory);
        push_bounded(&mut sma.luminosities, observation.luminosity, memory);
        sma
    }
}

impl Estimate for SimpleMovingAverage {
    fn predict(&mut self, _history: &History, t: u32) -> Prediction {
        let dt = t.saturating_sub(self.last_t) as f32;
        Prediction {
            position: self.last_position + mean(&self.slopes) * dt,
            thickness: mean(&self.thicknesses),
            luminosity: mean(&self.luminosities),
        }
    }

    fn integrate(&mut self, observation: &Observation, t: u32) {
        if t > self.last_t {
            let slope = (observation.position - self.last_position) / (t - self.last_t) as f32;
            push_bounded(&mut self.slopes, slope, self.memory);
        }
        push_bounded(&mut self.thicknesses, observation.thickness, self.memory);
        push_bounded(&mut self.luminosities, observation.luminosity, self.memory);
        self.last_t = t;
        self.last_position = observation.position;
    }
}

/// Exponentially decayed slope, thickness and luminosity
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    alpha: f32,
    slope: Option<f32>,
    thickness: f32,
    luminosity: f32,
    last_t: u32,
    last_position: f32,
}

impl ExponentialMovingAverage {
    pub fn new(observation: &Observation, t: u32, memory: usize) -> Self {
        Self {
            alpha: 2.0 / (memory.max(1) as f32 + 1.0),
            slope: None,
            thickness: observation.thickness,
            luminosity: observation.luminosity,
            last_t: t,
            last_position: observation.position,
        }
    }

    fn smooth(&self, previous: f32, value: f32) -> f32 {
        self.alpha * value + (1.0 - self.alpha) * previous
    }
}

impl Estimate for ExponentialMovingAverage {
    fn predict(&mut self, _history: &History, t: u32) -> Prediction {
        let dt = t.saturating_sub(self.last_t) as f32;
        Prediction {
            position: self.last_position + self.slope.unwrap_or(0.0) * dt,
            thickness: self.thickness,
            luminosity: self.luminosity,
        }
    }

    fn integrate(&mut self, observation: &Observation, t: u32) {
        if t > self.last_t {
            let raw = (observation.position - self.last_position) / (t - self.last_t) as f32;
            self.slope = Some(match self.slope {
                Some(previous) => self.smooth(previous, raw),
                None => raw,
            });
        }
        self.thickness = self.smooth(self.thickness, observation.thickness);
        self.luminosity = self.smooth(self.luminosity, observation.luminosity);
        self.last_t = t;
        self.last_position = observation.position;
    }
}
