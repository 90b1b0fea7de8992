/// Scores how alike two lines are. Implementations must be symmetric,
/// return values in `[0, 1]` and score identical strings as `1.0`.
pub trait Proximity: Send + Sync {
    fn proximity(&self, a: &str, b: &str) -> f64;
}

/// Jaro-Winkler similarity (prefix scale 0.1, prefix up to 4 chars).
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl Proximity for JaroWinkler {
    fn proximity(&self, a: &str, b: &str) -> f64 {
        strsim::jaro_winkler(a, b)
    }
}

impl<F> Proximity for F
where
    F: Fn(&str, &str) -> f64 + Send + Sync,
{
    fn proximity(&self, a: &str, b: &str) -> f64 {
        self(a, b)
    }
}
