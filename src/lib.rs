pub mod config;
pub mod error;
pub mod proximity;
pub mod normalize;
pub mod buckets;
pub mod matcher;
pub mod store;
pub mod scheduler;
pub mod patterns;
pub mod output;
pub mod progress;
pub mod engine;
pub mod logging;

pub use config::ClusterOpts;
pub use engine::{cluster_lines, Clusterer};
pub use error::ClusterError;
pub use patterns::Cluster;
