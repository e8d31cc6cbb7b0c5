//! Constant-velocity Kalman estimator
//!
//! # Model
//!
//! - State `S = [position, slope, thickness, luminosity]`
//! - Transition over `dt` scanlines: `position += slope * dt`, other
//!   components constant
//! - Measurement `X = C * S = [position, thickness, luminosity]` with noise
//!   `Vn = diag(2, 1, 12)`
//!
//! Prediction: `S' = A S`, `H' = A H A^T + Q dt`.
//! Update: `G = H' C^T (C H' C^T + Vn)^-1`, `S = S' + G (X - C S')`,
//! `H = (I - G C) H'`.

use super::{Estimate, Prediction};
use crate::history::History;
use crate::observation::Observation;
use nalgebra::{Matrix3, Matrix3x4, Matrix4, Vector3, Vector4};

/// Per-scanline process noise on `[position, slope, thickness, luminosity]`
const PROCESS_NOISE: [f32; 4] = [0.01, 0.0001, 0.01, 0.5];

/// Kalman estimator
#[derive(Debug, Clone)]
pub struct Kalman {
    state: Vector4<f32>,
    covariance: Matrix4<f32>,
    last_t: u32,
}

fn transition(dt: f32) -> Matrix4<f32> {
    let mut a = Matrix4::identity();
    a[(0, 1)] = dt;
    a
}

fn measurement() -> Matrix3x4<f32> {
    Matrix3x4::new(
        1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

fn measurement_noise() -> Matrix3<f32> {
    Matrix3::from_diagonal(&Vector3::new(2.0, 1.0, 12.0))
}

impl Kalman {
    pub fn new(observation: &Observation, t: u32) -> Self {
        Self {
            state: Vector4::new(
                observation.position,
                0.0,
                observation.thickness,
                observation.luminosity,
            ),
            covariance: Matrix4::identity(),
            last_t: t,
        }
    }

    /// Predicted state and covariance on scanline `t`
    fn propagate(&self, t: u32) -> (Vector4<f32>, Matrix4<f32>) {
        let dt = t.saturating_sub(self.last_t) as f32;
        let a = transition(dt);
        let q = Matrix4::from_diagonal(&Vector4::from(PROCESS_NOISE)) * dt;
        (a * self.state, a * self.covariance * a.transpose() + q)
    }

    /// Estimated slope in pixels per scanline
    pub fn slope(&self) -> f32 {
        self.state[1]
    }
}

impl Estimate for Kalman {
    fn predict(&mut self, _history: &History, t: u32) -> Prediction {
        let (state, _) = self.propagate(t);
        Prediction {
            position: state[0],
            thickness: state[2],
            luminosity: state[3],
        }
    }

    fn integrate(&mut self, observation: &Observation, t: u32) {
        let (predicted, covariance) = self.propagate(t);
        let c = measurement();
        let x = Vector3::new(
            observation.position,
            observation.thickness,
            observation.luminosity,
        );

        let innovation = c * covariance * c.transpose() + measurement_noise();
        let Some(innovation_inv) = innovation.try_inverse() else {
            // Degenerate covariance: restart from the observation
            self.state = Vector4::new(x[0], predicted[1], x[1], x[2]);
            self.covariance = Matrix4::identity();
            self.last_t = t;
            return;
        };

        let gain = covariance * c.transpose() * innovation_inv;
        self.state = predicted + gain * (x - c * predicted);
        self.covariance = (Matrix4::identity() - gain * c) * covariance;
        self.last_t = t;
    }
}
