use serde::{Deserialize, Serialize};

/// A seed line followed by every line matched to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub seed: String,
    pub members: Vec<String>,
}

impl Cluster {
    pub fn new(seed: String, members: Vec<String>) -> Self {
        Self { seed, members }
    }

    pub fn singleton(seed: String) -> Self {
        Self { seed, members: Vec::new() }
    }

    /// Seed plus matched members.
    pub fn len(&self) -> usize {
        self.members.len() + 1
    }

    pub fn is_singleton(&self) -> bool {
        self.members.is_empty()
    }

    /// Seed first, then members in the order they were matched.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.seed.as_str()).chain(self.members.iter().map(|m| m.as_str()))
    }
}

/// A cluster with its 1-based group number after ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCluster {
    pub group: usize,
    pub size: usize,
    pub seed: String,
    pub members: Vec<String>,
}

/// Order clusters by size (largest first); equal sizes fall back to seed order.
pub fn rank_clusters(mut clusters: Vec<Cluster>) -> Vec<Cluster> {
    clusters.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.seed.cmp(&b.seed)));
    clusters
}

/// Number already-ranked clusters starting at 1.
pub fn number_groups(ranked: &[Cluster]) -> Vec<RankedCluster> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, c)| RankedCluster {
            group: i + 1,
            size: c.len(),
            seed: c.seed.clone(),
            members: c.members.clone(),
        })
        .collect()
}
