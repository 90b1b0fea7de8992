use std::panic::{self, AssertUnwindSafe};
use crate::buckets::Window;
use crate::config::Threshold;
use crate::error::MatchError;
use crate::patterns::Cluster;
use crate::proximity::Proximity;
use crate::scheduler::panic_message;
use crate::store::GroupStore;

/// Greedy first-claim matcher for one focal bucket.
pub struct BucketMatcher<'a, P: Proximity + ?Sized> {
    proximity: &'a P,
    threshold: Threshold,
}

impl<'a, P: Proximity + ?Sized> BucketMatcher<'a, P> {
    pub fn new(proximity: &'a P, threshold: Threshold) -> Self {
        Self { proximity, threshold }
    }

    /// Drain the focal bucket of `window`, emitting one cluster per seed into `store`.
    /// Returns the number of clusters emitted.
    pub fn run(&self, window: &mut Window, store: &GroupStore) -> Result<usize, MatchError> {
        let key = window.key();
        log::debug!("bucket {}: processing {} lines (neighbors {:?})", key, window.focal_len(), window.neighbor_keys());
        let mut emitted = 0;
        while let Some(seed) = window.pop_seed() {
            let members = match self.collect_matches(&seed, window) {
                Ok(m) => m,
                Err(e) => {
                    window.return_line(key, seed);
                    return Err(e);
                }
            };
            store.append(Cluster::new(seed, members));
            emitted += 1;
        }
        log::trace!("bucket {}: emitted {} clusters", key, emitted);
        Ok(emitted)
    }

    /// On error, including a panicking oracle, every line taken for this seed goes back
    /// to the bucket it came from.
    fn collect_matches(&self, seed: &str, window: &mut Window) -> Result<Vec<String>, MatchError> {
        let key = window.key();
        let mut taken: Vec<(usize, String)> = Vec::new();
        let mut failure = None;
        for (scanned, bucket) in window.scan_order() {
            let res = bucket.take_matching(|candidate| {
                let score = panic::catch_unwind(AssertUnwindSafe(|| self.proximity.proximity(candidate, seed)))
                    .map_err(|payload| MatchError::Panicked { key, message: panic_message(payload.as_ref()) })?;
                if !(0.0..=1.0).contains(&score) {
                    return Err(MatchError::InvalidScore { key, score });
                }
                Ok(self.threshold.admits(score))
            });
            match res {
                Ok(matched) => {
                    if !matched.is_empty() {
                        log::trace!("bucket {}: {} matches for {:?} in bucket {}", key, matched.len(), seed, scanned);
                    }
                    taken.extend(matched.into_iter().map(|m| (scanned, m)));
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            for (scanned, line) in taken {
                window.return_line(scanned, line);
            }
            return Err(e);
        }
        Ok(taken.into_iter().map(|(_, m)| m).collect())
    }
}
