use std::time::Instant;

use crate::buckets::bucketize;
use crate::config::{ClusterOpts, Threshold};
use crate::error::ClusterError;
use crate::matcher::BucketMatcher;
use crate::normalize::{self, Candidates};
use crate::patterns::{rank_clusters, Cluster};
use crate::progress::ProgressReporter;
use crate::proximity::{JaroWinkler, Proximity};
use crate::scheduler::{CancelFlag, RunControl, RunStop, Scheduler};
use crate::store::GroupStore;

/// Clusters candidate lines by approximate similarity.
pub struct Clusterer<P: Proximity = JaroWinkler> {
    proximity: P,
    opts: ClusterOpts,
    threshold: Threshold,
    cancel: Option<CancelFlag>,
}

impl Clusterer<JaroWinkler> {
    pub fn new(opts: ClusterOpts) -> Result<Self, ClusterError> {
        Self::with_proximity(opts, JaroWinkler)
    }
}

impl<P: Proximity> Clusterer<P> {
    pub fn with_proximity(opts: ClusterOpts, proximity: P) -> Result<Self, ClusterError> {
        let threshold = opts.validate()?;
        Ok(Self { proximity, opts, threshold, cancel: None })
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn opts(&self) -> &ClusterOpts {
        &self.opts
    }

    /// Normalize raw text, then cluster what is left.
    pub fn cluster_text(&self, text: &str) -> Result<Vec<Cluster>, ClusterError> {
        let (candidates, _) = normalize::prepare_text(text, &self.opts.extra_stop_words);
        self.cluster(candidates)
    }

    /// Cluster an already prepared candidate set. Clusters come back ranked by size.
    /// On failure the clusters stored so far are carried inside the error, ranked the same way.
    pub fn cluster(&self, candidates: Candidates) -> Result<Vec<Cluster>, ClusterError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let started = Instant::now();
        let control = RunControl {
            deadline: self.opts.deadline.map(|d| started + d),
            cancel: self.cancel.clone(),
        };

        let total_lines = candidates.len();
        let mut buckets = bucketize(candidates.into_lines(), self.opts.bucket_width);
        log::debug!("{} candidates in {} buckets (width {})", total_lines, buckets.len(), buckets.width());

        let store = GroupStore::new();
        let matcher = BucketMatcher::new(&self.proximity, self.threshold);
        let progress = ProgressReporter::new(buckets.len(), self.opts.progress);
        let outcome = Scheduler::new(self.opts.phase_stride).run(&mut buckets, &matcher, &store, &control, &progress);

        let clusters = rank_clusters(store.into_clusters());
        match outcome {
            Ok(()) => {
                debug_assert_eq!(buckets.remaining(), 0);
                log::debug!("{} clusters from {} lines in {:?}", clusters.len(), total_lines, started.elapsed());
                Ok(clusters)
            }
            Err(RunStop::Failed { phase, failures }) => Err(ClusterError::WorkerFailure { phase, failures, partial: clusters }),
            Err(RunStop::Stopped { completed_phases, total_phases }) => {
                log::warn!("{} lines left unclustered", buckets.remaining());
                Err(ClusterError::Incomplete { completed_phases, total_phases, partial: clusters })
            }
        }
    }
}

/// Cluster already normalized lines with Jaro-Winkler at `threshold`.
pub fn cluster_lines<S: AsRef<str>>(lines: &[S], threshold: f64) -> Result<Vec<Cluster>, ClusterError> {
    let candidates = Candidates::from_normalized(lines.iter().map(|l| l.as_ref().to_string()));
    Clusterer::new(ClusterOpts::with_threshold(threshold))?.cluster(candidates)
}
