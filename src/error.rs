use thiserror::Error;
use crate::patterns::Cluster;

/// Failure of a single bucket matcher.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchError {
    #[error("bucket {key}: proximity score {score} is outside [0, 1]")]
    InvalidScore { key: usize, score: f64 },
    #[error("bucket {key}: matcher panicked: {message}")]
    Panicked { key: usize, message: String },
}

impl MatchError {
    pub fn key(&self) -> usize {
        match self {
            MatchError::InvalidScore { key, .. } | MatchError::Panicked { key, .. } => *key,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("invalid threshold {0}: expected a value in (0, 1]")]
    InvalidThreshold(f64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{} bucket matcher(s) failed in phase {phase}: {}", .failures.len(), join_failures(.failures))]
    WorkerFailure {
        phase: usize,
        failures: Vec<MatchError>,
        partial: Vec<Cluster>,
    },
    #[error("run stopped after {completed_phases} of {total_phases} phases")]
    Incomplete {
        completed_phases: usize,
        total_phases: usize,
        partial: Vec<Cluster>,
    },
}

impl ClusterError {
    /// Clusters that were stored before the run stopped.
    pub fn partial(&self) -> &[Cluster] {
        match self {
            ClusterError::WorkerFailure { partial, .. } | ClusterError::Incomplete { partial, .. } => partial,
            _ => &[],
        }
    }

    pub fn into_partial(self) -> Vec<Cluster> {
        match self {
            ClusterError::WorkerFailure { partial, .. } | ClusterError::Incomplete { partial, .. } => partial,
            _ => Vec::new(),
        }
    }
}

fn join_failures(failures: &[MatchError]) -> String {
    failures.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("; ")
}
