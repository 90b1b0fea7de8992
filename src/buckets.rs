use std::collections::{BTreeMap, VecDeque};
use itertools::Itertools;

/// Coarse length class of a line: `chars / width`.
pub fn bucket_key(line: &str, width: usize) -> usize {
    line.chars().count() / width.max(1)
}

/// Lines of one length class, kept in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    lines: VecDeque<String>,
}

impl Bucket {
    pub fn from_sorted(lines: Vec<String>) -> Self {
        Self { lines: lines.into() }
    }

    pub fn len(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }

    /// Put a line back at its sorted position.
    pub fn insert(&mut self, line: String) {
        let pos = self.lines.partition_point(|l| *l < line);
        self.lines.insert(pos, line);
    }

    /// Remove the next seed. Lines come out in ascending order.
    pub fn pop_seed(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    /// Remove and return every line the predicate accepts, in bucket order.
    /// On error the bucket keeps every line that was not yet taken.
    pub fn take_matching<F, E>(&mut self, mut accept: F) -> Result<Vec<String>, E>
    where
        F: FnMut(&str) -> Result<bool, E>,
    {
        let mut kept = VecDeque::with_capacity(self.lines.len());
        let mut taken = Vec::new();
        let mut rest = std::mem::take(&mut self.lines).into_iter();
        while let Some(line) = rest.next() {
            match accept(&line) {
                Ok(true) => taken.push(line),
                Ok(false) => kept.push_back(line),
                Err(e) => {
                    kept.push_back(line);
                    kept.extend(rest);
                    kept.extend(taken);
                    self.lines = kept.into_iter().sorted().collect();
                    return Err(e);
                }
            }
        }
        self.lines = kept;
        Ok(taken)
    }
}

/// All buckets of a run, keyed by `bucket_key`. Keys stay present after their bucket empties.
#[derive(Debug, Clone, Default)]
pub struct BucketMap {
    width: usize,
    buckets: BTreeMap<usize, Bucket>,
}

pub fn bucketize(lines: Vec<String>, width: usize) -> BucketMap {
    let width = width.max(1);
    let buckets = lines
        .into_iter()
        .into_group_map_by(|l| bucket_key(l, width))
        .into_iter()
        .map(|(k, v)| (k, Bucket::from_sorted(v.into_iter().sorted().collect())))
        .collect();
    BucketMap { width, buckets }
}

impl BucketMap {
    pub fn width(&self) -> usize { self.width }

    pub fn keys(&self) -> Vec<usize> {
        self.buckets.keys().copied().collect()
    }

    pub fn len(&self) -> usize { self.buckets.len() }
    pub fn is_empty(&self) -> bool { self.buckets.is_empty() }

    pub fn get(&self, key: usize) -> Option<&Bucket> {
        self.buckets.get(&key)
    }

    /// Lines not yet consumed by any matcher.
    pub fn remaining(&self) -> usize {
        self.buckets.values().map(Bucket::len).sum()
    }

    /// `{k-1, k, k+1}` restricted to keys that exist.
    pub fn neighbor_keys(&self, key: usize) -> Vec<usize> {
        let mut keys = vec![key];
        if let Some(below) = key.checked_sub(1) {
            if self.buckets.contains_key(&below) { keys.push(below); }
        }
        if self.buckets.contains_key(&(key + 1)) { keys.push(key + 1); }
        keys
    }

    /// Move the focal bucket and its neighbors out of the map so one matcher owns them.
    /// Returns `None` if `key` has no bucket in the map.
    pub fn take_window(&mut self, key: usize) -> Option<Window> {
        let focal = self.buckets.remove(&key)?;
        let below = key.checked_sub(1).and_then(|k| self.buckets.remove(&k).map(|b| (k, b)));
        let above = self.buckets.remove(&(key + 1)).map(|b| (key + 1, b));
        Some(Window { key, focal, below, above })
    }

    pub fn restore(&mut self, window: Window) {
        let Window { key, focal, below, above } = window;
        self.buckets.insert(key, focal);
        if let Some((k, b)) = below { self.buckets.insert(k, b); }
        if let Some((k, b)) = above { self.buckets.insert(k, b); }
    }

    /// Lines of every bucket, ordered by key.
    pub fn into_lines(self) -> Vec<String> {
        self.buckets.into_values().flat_map(|b| b.lines).collect()
    }
}

/// A focal bucket together with the neighbor buckets it may pull matches from.
#[derive(Debug)]
pub struct Window {
    key: usize,
    focal: Bucket,
    below: Option<(usize, Bucket)>,
    above: Option<(usize, Bucket)>,
}

impl Window {
    pub fn key(&self) -> usize { self.key }

    pub fn focal_len(&self) -> usize { self.focal.len() }

    pub fn pop_seed(&mut self) -> Option<String> {
        self.focal.pop_seed()
    }

    /// Buckets to scan for one seed: focal first, then `k-1`, then `k+1`.
    pub fn scan_order(&mut self) -> impl Iterator<Item = (usize, &mut Bucket)> + '_ {
        let key = self.key;
        std::iter::once((key, &mut self.focal))
            .chain(self.below.as_mut().map(|(k, b)| (*k, b)))
            .chain(self.above.as_mut().map(|(k, b)| (*k, b)))
    }

    /// Hand a line back to the bucket `key` it was taken from.
    pub fn return_line(&mut self, key: usize, line: String) {
        let found = self.scan_order().find(|(k, _)| *k == key);
        match found {
            Some((_, bucket)) => bucket.insert(line),
            None => {
                log::error!("bucket {} is not part of window {}; keeping {:?} in the focal bucket", key, self.key, line);
                self.focal.insert(line);
            }
        }
    }

    pub fn neighbor_keys(&self) -> Vec<usize> {
        std::iter::once(self.key)
            .chain(self.below.as_ref().map(|(k, _)| *k))
            .chain(self.above.as_ref().map(|(k, _)| *k))
            .collect()
    }
}
