use std::time::Duration;
use crate::error::ClusterError;

pub const DEFAULT_THRESHOLD: f64 = 0.85;
pub const DEFAULT_BUCKET_WIDTH: usize = 5;
/// Smallest stride for which two keys in the same phase can never be neighbors.
pub const MIN_PHASE_STRIDE: usize = 3;

/// Similarity cut-off in `(0, 1]`. Lines must score strictly above it to match.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, ClusterError> {
        if value.is_nan() || value <= 0.0 || value > 1.0 {
            return Err(ClusterError::InvalidThreshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn admits(self, score: f64) -> bool {
        score > self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

#[derive(Debug, Clone)]
pub struct ClusterOpts {
    pub threshold: f64,
    /// Characters per length bucket.
    pub bucket_width: usize,
    /// Number of scheduling phases; keys are assigned to phase `key % stride`.
    pub phase_stride: usize,
    /// Wall-clock budget for the whole run; checked between phases.
    pub deadline: Option<Duration>,
    pub progress: bool,
    pub extra_stop_words: Vec<String>,
}

impl Default for ClusterOpts {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            bucket_width: DEFAULT_BUCKET_WIDTH,
            phase_stride: MIN_PHASE_STRIDE,
            deadline: None,
            progress: false,
            extra_stop_words: Vec::new(),
        }
    }
}

impl ClusterOpts {
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold, ..Default::default() }
    }

    pub fn validate(&self) -> Result<Threshold, ClusterError> {
        let threshold = Threshold::new(self.threshold)?;
        if self.bucket_width == 0 {
            return Err(ClusterError::InvalidConfig("bucket width must be at least 1".into()));
        }
        if self.phase_stride < MIN_PHASE_STRIDE {
            return Err(ClusterError::InvalidConfig(format!(
                "phase stride {} is below {}; neighboring buckets would share a phase",
                self.phase_stride, MIN_PHASE_STRIDE
            )));
        }
        Ok(threshold)
    }
}
