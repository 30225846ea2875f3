//! Mutex-guarded path→contents map with mtime revalidation and idle-based eviction.

use crate::hashmap::ChainedMap;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// Default idle threshold: see SPEC_FULL.md §9 on the original source's nonsensical
/// `2,500,000`-nanosecond-vs-wrapping-`tv_nsec` comparison. 2.5 seconds is the documented,
/// monotonic-clock-based replacement.
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_millis(2500);

struct CacheEntry {
    contents: Arc<[u8]>,
    last_modified: SystemTime,
    last_read: Instant,
}

pub struct FileCache {
    root: PathBuf,
    entries: Mutex<ChainedMap<String, CacheEntry>>,
    idle_threshold: Duration,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_idle_threshold(root, DEFAULT_IDLE_THRESHOLD)
    }

    pub fn with_idle_threshold(root: impl Into<PathBuf>, idle_threshold: Duration) -> Self {
        Self {
            root: root.into(),
            entries: Mutex::new(ChainedMap::new()),
            idle_threshold,
        }
    }

    /// Looks up `path` (already derived and traversal-checked by the caller), reading through to
    /// disk on a miss and transparently refreshing a stale entry. Returns `None` if the file does
    /// not exist, or a stat/re-read fails.
    pub fn get(&self, path: &str) -> Option<Arc<[u8]>> {
        let full_path = self.root.join(path);
        let key = path.to_string();
        let mut entries = self.entries.lock();

        if !entries.contains_key(&key) {
            let (contents, mtime) = read_file_with_mtime(&full_path).ok()?;
            entries.insert(
                key.clone(),
                CacheEntry {
                    contents: Arc::from(contents.into_boxed_slice()),
                    last_modified: mtime,
                    last_read: Instant::now(),
                },
            );
        }

        let disk_mtime = fs::metadata(&full_path).and_then(|m| m.modified()).ok()?;

        let entry = entries
            .get_mut(&key)
            .expect("just inserted, or already present");

        if disk_mtime != entry.last_modified {
            let (contents, mtime) = read_file_with_mtime(&full_path).ok()?;
            entry.contents = Arc::from(contents.into_boxed_slice());
            entry.last_modified = mtime;
        }
        // Updated on every successful lookup, not only on a refresh: the Data Model defines
        // `last_read` as "most recent cache hit *or* refresh".
        entry.last_read = Instant::now();

        Some(Arc::clone(&entry.contents))
    }

    /// How often a background sweeper should call `sweep`: half the idle threshold, so an idle
    /// entry is evicted within roughly one threshold of going idle.
    pub fn sweep_interval(&self) -> Duration {
        self.idle_threshold / 2
    }

    /// Removes every entry that hasn't been read within the idle threshold. Reference-counted
    /// contents already handed out to a caller stay alive independent of this removal.
    pub fn sweep(&self) {
        let now = Instant::now();
        let threshold = self.idle_threshold;
        self.entries
            .lock()
            .retain(|_, entry| now.duration_since(entry.last_read) <= threshold);
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.entries.lock().len()
    }
}

fn read_file_with_mtime(path: &Path) -> std::io::Result<(Vec<u8>, SystemTime)> {
    let contents = fs::read(path)?;
    let mtime = fs::metadata(path)?.modified()?;
    Ok((contents, mtime))
}
