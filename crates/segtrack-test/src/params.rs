//! Regression checks
//!
//! A [`RegParams`] collects the outcome of numbered checks. No check
//! panics: every mismatch of a run is recorded and printed, and the
//! caller asserts on [`RegParams::cleanup`] once all checks are done.

use segtrack_core::Segment;
use std::fmt;

/// One failed check
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// 1-based number of the check in its test
    pub index: usize,
    pub detail: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "check {}: {}", self.index, self.detail)
    }
}

/// State of a running regression test
pub struct RegParams {
    name: String,
    index: usize,
    failures: Vec<Failure>,
}

impl RegParams {
    /// Start a regression test called `name`
    pub fn new(name: &str) -> Self {
        eprintln!("\n==== {name}_reg ====");
        Self {
            name: name.to_string(),
            index: 0,
            failures: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of checks run so far
    pub fn index(&self) -> usize {
        self.index
    }

    /// Count a check, recording `detail` when it failed
    fn record(&mut self, passed: bool, detail: impl FnOnce() -> String) -> bool {
        self.index += 1;
        if !passed {
            let failure = Failure {
                index: self.index,
                detail: detail(),
            };
            eprintln!("{}_reg: {failure}", self.name);
            self.failures.push(failure);
        }
        passed
    }

    /// Check that `actual` is within `delta` of `expected`
    ///
    /// A NaN on either side always fails.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        let diff = (expected - actual).abs();
        self.record(diff <= delta, || {
            format!("expected {expected}, got {actual} (diff {diff} > {delta})")
        })
    }

    /// Check a condition described by `what`
    pub fn check(&mut self, condition: bool, what: &str) -> bool {
        self.record(condition, || format!("condition failed: {what}"))
    }

    /// Check that two segment lists are identical
    ///
    /// On mismatch the first differing segment is reported by its
    /// endpoints.
    pub fn compare_segments(&mut self, expected: &[Segment], actual: &[Segment]) -> bool {
        let first_diff = if expected.len() != actual.len() {
            Some(expected.len().min(actual.len()))
        } else {
            expected.iter().zip(actual).position(|(a, b)| a != b)
        };
        self.record(first_diff.is_none(), || {
            let i = first_diff.unwrap_or_default();
            let ends = |segments: &[Segment]| segments.get(i).map(Segment::endpoints);
            format!(
                "{} vs {} segments, first difference at {i}: {:?} vs {:?}",
                expected.len(),
                actual.len(),
                ends(expected),
                ends(actual)
            )
        })
    }

    /// Whether no check failed so far
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Print the summary of the test
    ///
    /// # Returns
    ///
    /// `true` when every check passed.
    pub fn cleanup(self) -> bool {
        if self.is_success() {
            eprintln!("{}_reg: {} checks passed", self.name, self.index);
        } else {
            eprintln!(
                "{}_reg: {} of {} checks failed",
                self.name,
                self.failures.len(),
                self.index
            );
            for failure in &self.failures {
                eprintln!("  {failure}");
            }
        }
        self.is_success()
    }
}
