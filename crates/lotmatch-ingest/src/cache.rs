//! Memoised table loading.
//!
//! Entries are keyed by file identity rather than path alone: replacing a
//! file (new length or modification time) produces a different key, so a
//! stale parse is never served for new content. Expired entries are simply
//! re-read.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use tracing::debug;

use crate::error::{IngestError, Result};
use crate::table::LoadedTable;

/// Identity of one parse request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TableKey {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
    sheet: Option<String>,
    header_row: usize,
}

impl TableKey {
    fn for_file(path: &Path, sheet: Option<&str>, header_row: usize) -> Result<Self> {
        let read_error = |source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        };
        let canonical = path.canonicalize().map_err(read_error)?;
        let metadata = std::fs::metadata(&canonical).map_err(read_error)?;
        Ok(Self {
            path: canonical,
            len: metadata.len(),
            modified: metadata.modified().ok(),
            sheet: sheet.map(str::to_string),
            header_row,
        })
    }
}

#[derive(Debug)]
struct CacheEntry {
    loaded_at: Instant,
    table: Arc<LoadedTable>,
}

/// A TTL cache of parsed tables.
#[derive(Debug)]
pub struct TableCache {
    ttl: Duration,
    entries: HashMap<TableKey, CacheEntry>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the cached table for this file, sheet and header row, or parses it.
    pub fn load(
        &mut self,
        path: &Path,
        sheet: Option<&str>,
        header_row: usize,
    ) -> Result<Arc<LoadedTable>> {
        self.load_with(path, sheet, header_row, |path, sheet, header_row| {
            crate::read_table(path, sheet, header_row)
        })
    }

    /// Like [`TableCache::load`] with an explicit loader for cache misses.
    pub fn load_with<F>(
        &mut self,
        path: &Path,
        sheet: Option<&str>,
        header_row: usize,
        loader: F,
    ) -> Result<Arc<LoadedTable>>
    where
        F: FnOnce(&Path, Option<&str>, usize) -> Result<LoadedTable>,
    {
        let now = Instant::now();
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.duration_since(entry.loaded_at) < ttl);

        let key = TableKey::for_file(path, sheet, header_row)?;
        if let Some(entry) = self.entries.get(&key) {
            debug!(path = %path.display(), "table cache hit");
            return Ok(Arc::clone(&entry.table));
        }

        debug!(path = %path.display(), "table cache miss");
        let table = Arc::new(loader(path, sheet, header_row)?);
        self.entries.insert(
            key,
            CacheEntry {
                loaded_at: now,
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::table::RawTable;

    fn counting_loader(
        calls: &Cell<usize>,
    ) -> impl FnOnce(&Path, Option<&str>, usize) -> Result<LoadedTable> + '_ {
        move |_, _, _| {
            calls.set(calls.get() + 1);
            Ok(LoadedTable {
                source_label: "sheet".to_string(),
                table: RawTable::default(),
            })
        }
    }

    #[test]
    fn repeated_loads_hit_the_cache() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "a,b").expect("write");
        let calls = Cell::new(0);
        let mut cache = TableCache::new(Duration::from_secs(600));

        cache
            .load_with(file.path(), None, 0, counting_loader(&calls))
            .expect("first load");
        cache
            .load_with(file.path(), None, 0, counting_loader(&calls))
            .expect("second load");
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_header_rows_are_separate_entries() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "a,b").expect("write");
        let calls = Cell::new(0);
        let mut cache = TableCache::new(Duration::from_secs(600));

        cache
            .load_with(file.path(), None, 0, counting_loader(&calls))
            .expect("header 0");
        cache
            .load_with(file.path(), None, 1, counting_loader(&calls))
            .expect("header 1");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn changed_content_forces_a_reparse() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "a,b").expect("write");
        let calls = Cell::new(0);
        let mut cache = TableCache::new(Duration::from_secs(600));

        cache
            .load_with(file.path(), None, 0, counting_loader(&calls))
            .expect("first load");
        writeln!(file, "1,2").expect("append");
        file.flush().expect("flush");
        cache
            .load_with(file.path(), None, 0, counting_loader(&calls))
            .expect("reload");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn expired_entries_are_reloaded() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "a,b").expect("write");
        let calls = Cell::new(0);
        let mut cache = TableCache::new(Duration::ZERO);

        cache
            .load_with(file.path(), None, 0, counting_loader(&calls))
            .expect("first load");
        cache
            .load_with(file.path(), None, 0, counting_loader(&calls))
            .expect("second load");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let mut cache = TableCache::new(Duration::from_secs(1));
        let err = cache
            .load(Path::new("/nonexistent/specs.csv"), None, 0)
            .unwrap_err();
        assert!(matches!(err, IngestError::FileRead { .. }));
    }
}
