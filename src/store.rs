use std::sync::Mutex;
use crate::patterns::Cluster;

/// Append-only cluster collection shared by all matchers of a run.
#[derive(Debug, Default)]
pub struct GroupStore {
    clusters: Mutex<Vec<Cluster>>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, cluster: Cluster) {
        // poisoned by a panicking matcher; the vec itself is still whole
        let mut guard = self.clusters.lock().unwrap_or_else(|e| e.into_inner());
        guard.push(cluster);
    }

    pub fn len(&self) -> usize {
        self.clusters.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of everything stored so far.
    pub fn snapshot(&self) -> Vec<Cluster> {
        self.clusters.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}
