use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use rayon::prelude::*;

use crate::buckets::{BucketMap, Window};
use crate::config::MIN_PHASE_STRIDE;
use crate::error::MatchError;
use crate::matcher::BucketMatcher;
use crate::progress::ProgressReporter;
use crate::proximity::Proximity;
use crate::store::GroupStore;

/// Split bucket keys into `stride` phases, phase `i` holding the keys with `key % stride == i`.
///
/// Keys sharing a phase differ by at least `stride`, so for `stride >= 3` their
/// `{k-1, k, k+1}` windows never overlap. Every key lands in exactly one phase.
/// Keys inside a phase stay in ascending order.
pub fn phase_partition(keys: &[usize], stride: usize) -> Vec<Vec<usize>> {
    let stride = stride.max(MIN_PHASE_STRIDE);
    let mut phases = vec![Vec::new(); stride];
    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    for key in sorted {
        phases[key % stride].push(key);
    }
    phases
}

/// True when no two keys of a phase are the same or adjacent.
pub fn phase_is_independent(phase: &[usize]) -> bool {
    let mut sorted = phase.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).all(|w| w[1] - w[0] >= 3)
}

/// Shared stop signal, e.g. set from a Ctrl+C handler.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Checked between phases only; a running phase always completes.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    pub deadline: Option<Instant>,
    pub cancel: Option<CancelFlag>,
}

impl RunControl {
    pub fn should_stop(&self) -> bool {
        if self.cancel.as_ref().map(CancelFlag::is_cancelled).unwrap_or(false) {
            return true;
        }
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunStop {
    Failed { phase: usize, failures: Vec<MatchError> },
    Stopped { completed_phases: usize, total_phases: usize },
}

pub struct Scheduler {
    stride: usize,
}

impl Scheduler {
    pub fn new(stride: usize) -> Self {
        Self { stride: stride.max(MIN_PHASE_STRIDE) }
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Run every bucket's matcher, one phase at a time, with a join barrier between phases.
    pub fn run<P: Proximity + ?Sized>(
        &self,
        buckets: &mut BucketMap,
        matcher: &BucketMatcher<'_, P>,
        store: &GroupStore,
        control: &RunControl,
        progress: &ProgressReporter,
    ) -> Result<(), RunStop> {
        let phases = phase_partition(&buckets.keys(), self.stride);
        let total_phases = phases.len();
        for (idx, keys) in phases.iter().enumerate() {
            if control.should_stop() {
                log::warn!("stopping before phase {} of {}", idx + 1, total_phases);
                return Err(RunStop::Stopped { completed_phases: idx, total_phases });
            }
            if keys.is_empty() {
                continue;
            }
            debug_assert!(phase_is_independent(keys));
            log::debug!("phase {}: {} buckets {:?}", idx, keys.len(), keys);
            let failures = run_phase(buckets, keys, matcher, store, progress);
            if !failures.is_empty() {
                for f in &failures {
                    log::error!("{}", f);
                }
                return Err(RunStop::Failed { phase: idx, failures });
            }
        }
        Ok(())
    }
}

fn run_phase<P: Proximity + ?Sized>(
    buckets: &mut BucketMap,
    keys: &[usize],
    matcher: &BucketMatcher<'_, P>,
    store: &GroupStore,
    progress: &ProgressReporter,
) -> Vec<MatchError> {
    let mut windows: Vec<Window> = keys.iter().filter_map(|&k| buckets.take_window(k)).collect();
    let results: Vec<Result<usize, MatchError>> = windows
        .par_iter_mut()
        .map(|window| {
            let key = window.key();
            let res = panic::catch_unwind(AssertUnwindSafe(|| matcher.run(window, store)))
                .unwrap_or_else(|payload| Err(MatchError::Panicked { key, message: panic_message(payload.as_ref()) }));
            progress.bucket_done(key);
            res
        })
        .collect();
    for w in windows {
        buckets.restore(w);
    }
    results.into_iter().filter_map(Result::err).collect()
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
