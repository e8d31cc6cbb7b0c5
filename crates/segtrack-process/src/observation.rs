//! Scanline observation extraction
//!
//! Turns one line of samples into the observations trackers are matched
//! against.
//!
//! # Algorithm Overview
//!
//! **Binary mode**
//!
//! 1. A pixel below `max_luminosity` opens a run.
//! 2. The run grows while pixels stay below `max_max_luminosity`, tracking
//!    the darkest value `min`.
//! 3. With `m = min + (max_max_luminosity - min) * ratio_luminosity`, both
//!    ends are trimmed while they are brighter than `m`.
//! 4. The trimmed run yields its midpoint, length and mean luminosity.
//!
//! **Gradient mode**
//!
//! 1. A pixel whose central difference exceeds `gradient_threshold` in
//!    magnitude opens a run with the sign of that difference.
//! 2. The run grows while the signed central difference stays at least the
//!    threshold.
//! 3. The run yields its midpoint, length and the signed gradient across it.

use segtrack_core::{ExtractionMode, SegDetParams};

/// A run observed on one scanline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub position: f32,
    pub thickness: f32,
    pub luminosity: f32,
}

impl Observation {
    pub fn new(position: f32, thickness: f32, luminosity: f32) -> Self {
        Self {
            position,
            thickness,
            luminosity,
        }
    }

    /// Pixel band `[floor(position - thickness / 2), ceil(position + thickness / 2)]`
    pub fn band(&self) -> (f32, f32) {
        let half = self.thickness / 2.0;
        (
            (self.position - half).floor(),
            (self.position + half).ceil(),
        )
    }
}

/// Extract the observations of one scanline
///
/// # Arguments
///
/// * `line` - Samples of the scanline
/// * `params` - Detector configuration (mode and thresholds)
///
/// # Returns
///
/// Observations ordered by position. An empty line yields none.
pub fn extract_observations(line: &[u8], params: &SegDetParams) -> Vec<Observation> {
    match params.extraction_mode {
        ExtractionMode::Binary => extract_binary(
            line,
            params.max_luminosity,
            params.max_max_luminosity,
            params.ratio_luminosity,
        ),
        ExtractionMode::Gradient => extract_gradient(line, params.gradient_threshold),
    }
}

/// Dark-run extraction
///
/// # Arguments
///
/// * `line` - Samples of the scanline
/// * `max_luminosity` - A pixel below this value opens a run
/// * `ceiling` - The run grows while pixels stay below this value
/// * `ratio` - Fraction of the run's dynamic range kept when trimming
pub fn extract_binary(line: &[u8], max_luminosity: u8, ceiling: u8, ratio: f32) -> Vec<Observation> {
    let mut observations = Vec::new();
    let len = line.len();
    let mut n = 0;

    while n < len {
        if line[n] >= max_luminosity {
            n += 1;
            continue;
        }

        let start = n;
        let mut end = n;
        let mut min = line[n];
        while end + 1 < len && line[end + 1] < ceiling {
            end += 1;
            min = min.min(line[end]);
        }

        // The darkest pixel is never brighter than the trim level, so
        // trimming always leaves at least one pixel.
        let medium = min as f32 + (ceiling as f32 - min as f32) * ratio;
        let mut lo = start;
        while lo < end && line[lo] as f32 > medium {
            lo += 1;
        }
        let mut hi = end;
        while hi > lo && line[hi] as f32 > medium {
            hi -= 1;
        }

        let sum: u32 = line[lo..=hi].iter().map(|&v| v as u32).sum();
        let thickness = (hi - lo + 1) as f32;
        observations.push(Observation::new(
            (lo + hi) as f32 / 2.0,
            thickness,
            sum as f32 / thickness,
        ));

        // line[end + 1], if any, is at least the ceiling and cannot open a run
        n = end + 1;
    }

    observations
}

/// Signed-gradient run extraction
///
/// Lines shorter than three pixels have no central difference and yield no
/// observation.
pub fn extract_gradient(line: &[u8], threshold: i32) -> Vec<Observation> {
    let mut observations = Vec::new();
    let len = line.len();
    if len < 3 {
        return observations;
    }

    let diff = |a: usize, b: usize| line[a] as i32 - line[b] as i32;
    let mut n = 1;
    while n + 1 < len {
        let gradient = diff(n + 1, n - 1);
        if gradient.abs() <= threshold {
            n += 1;
            continue;
        }

        let sign = gradient.signum();
        let mut thickness = 1;
        while n + thickness + 1 < len && diff(n + thickness + 1, n + thickness - 1) * sign >= threshold {
            thickness += 1;
        }

        let across = diff(n + thickness, n - 1);
        observations.push(Observation::new(
            (2 * n + thickness - 1) as f32 / 2.0,
            thickness as f32,
            across as f32,
        ));
        n += thickness + 1;
    }

    observations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_luminosity: u8) -> SegDetParams {
        SegDetParams::new().with_max_luminosity(max_luminosity)
    }

    #[test]
    fn test_empty_line() {
        assert!(extract_observations(&[255; 8], &params(200)).is_empty());
        assert!(extract_observations(&[], &params(200)).is_empty());
    }

    #[test]
    fn test_single_dark_run() {
        let obs = extract_observations(&[255, 0, 0, 0, 255], &params(200));
        assert_eq!(obs, vec![Observation::new(2.0, 3.0, 0.0)]);
    }

    #[test]
    fn test_two_runs_split_by_bright_pixel() {
        let obs = extract_observations(&[0, 0, 255, 128, 128], &params(200));
        assert_eq!(
            obs,
            vec![
                Observation::new(0.5, 2.0, 0.0),
                Observation::new(3.5, 2.0, 128.0),
            ]
        );
    }

    #[test]
    fn test_trimming_with_ratio() {
        // min 0, ceiling 200, ratio 0.5: pixels brighter than 100 are trimmed
        let obs = extract_binary(&[255, 150, 10, 0, 20, 180, 255], 200, 200, 0.5);
        assert_eq!(obs, vec![Observation::new(3.0, 3.0, 10.0)]);
    }

    #[test]
    fn test_ceiling_extends_run() {
        // 210 does not open a run but continues one below the ceiling
        let line = [255, 0, 210, 0, 255];
        assert_eq!(extract_binary(&line, 200, 200, 1.0).len(), 2);
        assert_eq!(
            extract_binary(&line, 200, 230, 1.0),
            vec![Observation::new(2.0, 3.0, 70.0)]
        );
    }

    #[test]
    fn test_boundary_runs() {
        let obs = extract_binary(&[0, 255, 255, 0], 200, 200, 1.0);
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].position, 0.0);
        assert_eq!(obs[1].position, 3.0);
    }

    #[test]
    fn test_gradient_edges() {
        let line = [200, 200, 200, 20, 20, 20, 200, 200];
        let obs = extract_gradient(&line, 30);
        assert_eq!(obs.len(), 2);
        // falling edge between 2 and 3
        assert_eq!(obs[0].position, 2.5);
        assert!(obs[0].luminosity < 0.0);
        // rising edge between 5 and 6
        assert_eq!(obs[1].position, 5.5);
        assert!(obs[1].luminosity > 0.0);
    }

    #[test]
    fn test_gradient_short_line() {
        assert!(extract_gradient(&[0, 255], 30).is_empty());
    }

    #[test]
    fn test_band() {
        assert_eq!(Observation::new(20.0, 3.0, 0.0).band(), (18.0, 22.0));
        assert_eq!(Observation::new(22.5, 8.0, 0.0).band(), (18.0, 27.0));
    }
}
