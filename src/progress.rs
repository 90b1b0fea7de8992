use std::sync::atomic::{AtomicUsize, Ordering};

const BAR_WIDTH: usize = 100;

/// `[###   ]` bar, one `#` per percent done.
pub fn render_bar(total: usize, done: usize) -> String {
    let pct = if total == 0 { BAR_WIDTH } else { (done.min(total) * BAR_WIDTH) / total };
    format!("[{}{}]", "#".repeat(pct), " ".repeat(BAR_WIDTH - pct))
}

/// Counts finished buckets across workers.
#[derive(Debug)]
pub struct ProgressReporter {
    total: usize,
    done: AtomicUsize,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(total: usize, enabled: bool) -> Self {
        Self { total, done: AtomicUsize::new(0), enabled }
    }

    pub fn disabled() -> Self {
        Self::new(0, false)
    }

    pub fn bucket_done(&self, key: usize) -> usize {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if self.enabled {
            log::info!("{} bucket {} ({}/{})", render_bar(self.total, done), key, done, self.total);
        }
        done
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}
