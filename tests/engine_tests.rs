use logcluster::config::ClusterOpts;
use logcluster::engine::{cluster_lines, Clusterer};
use logcluster::error::ClusterError;
use logcluster::normalize::Candidates;
use logcluster::patterns::Cluster;
use logcluster::proximity::{JaroWinkler, Proximity};
use std::collections::BTreeSet;

fn sample_logs() -> Vec<&'static str> {
    vec![
        "connection refused to db-01",
        "connection refused to db-02",
        "connection refused to db-03",
        "user admin logged in",
        "user guest logged in",
        "user root logged in",
        "cache miss for key session",
        "cache miss for key sessions",
        "payment declined",
        "disk quota exceeded on volume data",
    ]
}

fn find<'a>(clusters: &'a [Cluster], seed: &str) -> &'a Cluster {
    clusters.iter().find(|c| c.seed == seed).unwrap_or_else(|| panic!("no cluster seeded by {}", seed))
}

#[test]
fn disk_full_variants_group_together() {
    let text = "error: disk full\nerror: disk fulll\nwarning: low memory\n";
    let clusterer = Clusterer::new(ClusterOpts::with_threshold(0.85)).unwrap();
    let clusters = clusterer.cluster_text(text).unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0], Cluster::new("error disk full".into(), vec!["error disk fulll".into()]));
    assert_eq!(clusters[1], Cluster::singleton("warning low memory".into()));
}

#[test]
fn empty_input_is_not_an_error() {
    let empty: Vec<&str> = Vec::new();
    assert!(cluster_lines(&empty, 0.5).unwrap().is_empty());
    let clusterer = Clusterer::new(ClusterOpts::default()).unwrap();
    assert!(clusterer.cluster_text("\n  \n12.5\nok\n").unwrap().is_empty());
}

#[test]
fn identical_lines_collapse_to_one_singleton() {
    let clusterer = Clusterer::new(ClusterOpts::with_threshold(0.9)).unwrap();
    let clusters = clusterer.cluster_text("Timeout!\ntimeout\n  TIMEOUT  \n").unwrap();
    assert_eq!(clusters, vec![Cluster::singleton("timeout".into())]);
}

#[test]
fn every_line_lands_in_exactly_one_cluster() {
    let logs = sample_logs();
    for t in [0.5, 0.85, 0.95, 1.0] {
        let clusters = cluster_lines(&logs, t).unwrap();
        let mut all: Vec<&str> = clusters.iter().flat_map(|c| c.lines()).collect();
        all.sort();
        let mut expected = logs.clone();
        expected.sort();
        assert_eq!(all, expected, "threshold {}", t);
    }
}

#[test]
fn clusters_are_ranked_by_size() {
    let clusters = cluster_lines(&sample_logs(), 0.9).unwrap();
    assert_eq!(clusters[0].seed, "connection refused to db-01");
    assert_eq!(clusters[0].len(), 3);
    assert_eq!(clusters[1].seed, "cache miss for key session");
    assert_eq!(clusters[1].members, vec!["cache miss for key sessions".to_string()]);
    assert!(clusters.windows(2).all(|w| w[0].len() >= w[1].len()));
}

#[test]
fn lower_bucket_phase_claims_shared_neighbors_first() {
    // "user root logged in" (key 3) runs in phase 0 and claims a line from bucket 4
    let clusters = cluster_lines(&sample_logs(), 0.88).unwrap();
    let root = find(&clusters, "user root logged in");
    assert_eq!(root.members, vec!["user guest logged in".to_string()]);
    assert!(find(&clusters, "user admin logged in").is_singleton());
}

#[test]
fn threshold_of_one_only_groups_identical_scores() {
    let clusters = cluster_lines(&sample_logs(), 1.0).unwrap();
    assert_eq!(clusters.len(), sample_logs().len());
    assert!(clusters.iter().all(Cluster::is_singleton));
}

#[test]
fn members_score_above_threshold_against_their_seed() {
    let t = 0.8;
    for c in cluster_lines(&sample_logs(), t).unwrap() {
        for m in &c.members {
            assert!(JaroWinkler.proximity(&c.seed, m) > t, "{} / {}", c.seed, m);
        }
    }
}

#[test]
fn reruns_are_identical() {
    let a = cluster_lines(&sample_logs(), 0.85).unwrap();
    let b = cluster_lines(&sample_logs(), 0.85).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_threshold_is_rejected_before_running() {
    assert!(matches!(cluster_lines(&sample_logs(), 0.0), Err(ClusterError::InvalidThreshold(_))));
    assert!(matches!(cluster_lines(&sample_logs(), 1.5), Err(ClusterError::InvalidThreshold(_))));
    assert!(matches!(
        Clusterer::new(ClusterOpts { phase_stride: 2, ..Default::default() }),
        Err(ClusterError::InvalidConfig(_))
    ));
}

#[test]
fn worker_failure_reports_partial_clusters() {
    let oracle = |a: &str, b: &str| if a.contains("poison") || b.contains("poison") { 7.0 } else { 0.0 };
    let clusterer = Clusterer::with_proximity(ClusterOpts::default(), oracle).unwrap();
    // "ab" is key 0 (phase 0), "poison!!" is key 1 (phase 1), "abcdefghijk" is key 2 (phase 2)
    let candidates = Candidates::from_normalized(["ab", "poison!!", "abcdefghijk"]);
    let err = clusterer.cluster(candidates).unwrap_err();
    match &err {
        ClusterError::WorkerFailure { phase, failures, partial } => {
            assert_eq!(*phase, 0);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].key(), 0);
            assert!(partial.is_empty());
        }
        other => panic!("expected worker failure, got {:?}", other),
    }
}

#[test]
fn zero_deadline_reports_incomplete_run() {
    let opts = ClusterOpts { deadline: Some(std::time::Duration::ZERO), ..ClusterOpts::with_threshold(0.9) };
    let err = Clusterer::new(opts).unwrap().cluster(Candidates::from_normalized(sample_logs())).unwrap_err();
    match err {
        ClusterError::Incomplete { completed_phases, total_phases, ref partial } => {
            assert_eq!(completed_phases, 0);
            assert_eq!(total_phases, 3);
            assert!(partial.is_empty());
        }
        other => panic!("expected incomplete run, got {:?}", other),
    }
}

#[test]
fn wide_buckets_put_everything_in_one_window() {
    let opts = ClusterOpts { bucket_width: 100, ..ClusterOpts::with_threshold(0.9) };
    let clusters = Clusterer::new(opts).unwrap().cluster(Candidates::from_normalized(sample_logs())).unwrap();
    let seen: BTreeSet<&str> = clusters.iter().flat_map(|c| c.lines()).collect();
    assert_eq!(seen.len(), sample_logs().len());
}
