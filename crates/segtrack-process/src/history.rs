//! Bounded sample history of a tracker

use std::collections::VecDeque;

/// One integrated observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub t: u32,
    pub position: f32,
    pub thickness: f32,
    pub luminosity: f32,
}

/// The last `capacity` samples of a tracker, oldest first
#[derive(Debug, Clone)]
pub struct History {
    samples: VecDeque<Sample>,
    capacity: usize,
}

/// Population standard deviations of the three sample components
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spread {
    pub position: f32,
    pub thickness: f32,
    pub luminosity: f32,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample, returning the evicted oldest one when full
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front()
        } else {
            None
        }
    }

    /// Remove and return every sample, oldest first
    pub fn drain(&mut self) -> Vec<Sample> {
        self.samples.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.samples.iter()
    }

    /// The last `n` samples, oldest first; `None` when fewer are stored
    pub fn tail(&self, n: usize) -> Option<impl Iterator<Item = &Sample>> {
        let len = self.samples.len();
        (n <= len).then(|| self.samples.range(len - n..))
    }

    /// Least-squares fit `position = slope * t + intercept`
    ///
    /// Returns `None` with fewer than two distinct scanlines.
    pub fn regression(&self) -> Option<(f32, f32)> {
        let t0 = self.samples.front()?.t as f64;
        let n = self.samples.len() as f64;
        let (mut st, mut sp, mut stt, mut stp) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
        for s in &self.samples {
            let t = s.t as f64 - t0;
            let p = s.position as f64;
            st += t;
            sp += p;
            stt += t * t;
            stp += t * p;
        }
        let denom = n * stt - st * st;
        if denom.abs() < 1e-9 {
            return None;
        }
        let slope = (n * stp - st * sp) / denom;
        let intercept = (sp - slope * st) / n - slope * t0;
        Some((slope as f32, intercept as f32))
    }

    /// Slope of the regression line, 0 when undefined
    pub fn slope(&self) -> f32 {
        self.regression().map_or(0.0, |(slope, _)| slope)
    }

    /// Population standard deviation of each component
    pub fn spread(&self) -> Spread {
        if self.samples.is_empty() {
            return Spread::default();
        }
        let n = self.samples.len() as f64;
        let std = |get: fn(&Sample) -> f32| {
            let mean = self.samples.iter().map(|s| get(s) as f64).sum::<f64>() / n;
            let var = self
                .samples
                .iter()
                .map(|s| {
                    let d = get(s) as f64 - mean;
                    d * d
                })
                .sum::<f64>()
                / n;
            var.sqrt() as f32
        };
        Spread {
            position: std(|s| s.position),
            thickness: std(|s| s.thickness),
            luminosity: std(|s| s.luminosity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: u32, position: f32) -> Sample {
        Sample {
            t,
            position,
            thickness: 3.0,
            luminosity: 0.0,
        }
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut h = History::new(3);
        for t in 0..3 {
            assert!(h.push(sample(t, 0.0)).is_none());
        }
        assert_eq!(h.push(sample(3, 0.0)).map(|s| s.t), Some(0));
        assert_eq!(h.len(), 3);
        assert_eq!(h.first().map(|s| s.t), Some(1));
    }

    #[test]
    fn test_regression() {
        let mut h = History::new(10);
        assert!(h.regression().is_none());
        h.push(sample(100, 5.0));
        assert!(h.regression().is_none());
        assert_eq!(h.slope(), 0.0);
        for t in 101..105 {
            h.push(sample(t, 5.0 + 0.5 * (t - 100) as f32));
        }
        let (slope, intercept) = h.regression().unwrap();
        assert!((slope - 0.5).abs() < 1e-5);
        assert!((slope * 110.0 + intercept - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_spread() {
        let mut h = History::new(10);
        h.push(sample(0, 1.0));
        assert_eq!(h.spread(), Spread::default());
        h.push(sample(1, 3.0));
        let spread = h.spread();
        assert!((spread.position - 1.0).abs() < 1e-6);
        assert_eq!(spread.thickness, 0.0);
    }

    #[test]
    fn test_tail() {
        let mut h = History::new(5);
        for t in 0..5 {
            h.push(sample(t, t as f32));
        }
        let ts: Vec<u32> = h.tail(2).unwrap().map(|s| s.t).collect();
        assert_eq!(ts, vec![3, 4]);
        assert!(h.tail(6).is_none());
    }
}
