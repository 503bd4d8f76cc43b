// Append-only record store mirrored to a single JSON file

use crate::json;
use crate::record::GeneratedRecord;
use eyre::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default backing file name, relative to the working directory
pub const DEFAULT_RESULTS_FILE: &str = "freelance_results.json";

/// Ordered log of generated records
///
/// The in-memory list is loaded once at `open` and is the source of truth from then on; the
/// backing file is rewritten in full on every `append` and never re-read.
pub struct Store {
    path: PathBuf,
    records: Vec<GeneratedRecord>,
}

impl Store {
    /// Open the store backed by `path`
    ///
    /// A missing file gives an empty store. A file that cannot be read or parsed also gives an
    /// empty store; it is moved aside to `<name>.corrupt` (or `<name>.corrupt.2`, `.3`, ... when
    /// earlier backups exist) first so the next append does not overwrite it.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let records = Self::load(&path);
        Self { path, records }
    }

    fn load(path: &Path) -> Vec<GeneratedRecord> {
        if !path.exists() {
            debug!(file = ?path, "No results file yet, starting empty");
            return Vec::new();
        }

        match json::read_json::<Vec<GeneratedRecord>>(path) {
            Ok(records) => {
                info!(file = ?path, count = records.len(), "Loaded results");
                records
            }
            Err(e) => {
                warn!(file = ?path, error = ?e, "Failed to load results, starting empty");
                Self::preserve_corrupt(path);
                Vec::new()
            }
        }
    }

    fn preserve_corrupt(path: &Path) {
        let backup = corrupt_backup_path(path);

        match fs::rename(path, &backup) {
            Ok(()) => warn!(file = ?path, backup = ?backup, "Moved unreadable results file aside"),
            Err(e) => warn!(file = ?path, error = ?e, "Failed to move unreadable results file aside"),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record and rewrite the backing file
    ///
    /// If the write fails the record is dropped from memory again and the error is returned, so
    /// memory never holds records the file lacks.
    pub fn append(&mut self, record: GeneratedRecord) -> Result<()> {
        self.records.push(record);

        if let Err(e) = json::rewrite_json(&self.path, &self.records) {
            self.records.pop();
            return Err(e.wrap_err("Failed to persist results"));
        }

        debug!(file = ?self.path, count = self.records.len(), "Appended record");
        Ok(())
    }

    /// All records in insertion order
    pub fn all(&self) -> &[GeneratedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// First `<name>.corrupt[.N]` name not already taken
fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut attempt = 1u32;
    loop {
        let mut backup = path.as_os_str().to_owned();
        backup.push(".corrupt");
        if attempt > 1 {
            backup.push(format!(".{}", attempt));
        }
        let backup = PathBuf::from(backup);
        if !backup.exists() {
            return backup;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Platform;
    use tempfile::TempDir;

    fn record(platform: Platform, title: &str) -> GeneratedRecord {
        GeneratedRecord {
            platform,
            category: "Web Development".to_string(),
            title: title.to_string(),
            description: format!("Description of {}", title),
            tags: "a, b".to_string(),
            pricing: "50".to_string(),
            timestamp: "2024-01-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_open_nonexistent_file() {
        let temp = TempDir::new().unwrap();
        let store = Store::open(temp.path().join(DEFAULT_RESULTS_FILE));

        assert!(store.is_empty());
        assert!(store.all().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_append_preserves_order() {
        let temp = TempDir::new().unwrap();
        let mut store = Store::open(temp.path().join(DEFAULT_RESULTS_FILE));

        let records = vec![
            record(Platform::Fiverr, "first"),
            record(Platform::Upwork, "second"),
            record(Platform::Fiverr, "third"),
        ];
        for r in &records {
            store.append(r.clone()).unwrap();
        }

        assert_eq!(store.len(), 3);
        assert_eq!(store.all(), records.as_slice());
    }

    #[test]
    fn test_append_rewrites_whole_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_RESULTS_FILE);
        let mut store = Store::open(&path);

        store.append(record(Platform::Fiverr, "first")).unwrap();
        store.append(record(Platform::Upwork, "second")).unwrap();

        let on_disk: Vec<GeneratedRecord> = json::read_json(&path).unwrap();
        assert_eq!(on_disk, store.all());
    }

    #[test]
    fn test_reopen_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_RESULTS_FILE);

        let mut store = Store::open(&path);
        store.append(record(Platform::Fiverr, "first")).unwrap();
        store.append(record(Platform::Upwork, "second")).unwrap();
        let before = store.all().to_vec();
        drop(store);

        let reopened = Store::open(&path);
        assert_eq!(reopened.all(), before.as_slice());
    }

    #[test]
    fn test_file_not_reread_after_open() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_RESULTS_FILE);

        let mut store = Store::open(&path);
        store.append(record(Platform::Fiverr, "first")).unwrap();

        fs::write(&path, "[]").unwrap();
        assert_eq!(store.len(), 1);

        store.append(record(Platform::Upwork, "second")).unwrap();
        let on_disk: Vec<GeneratedRecord> = json::read_json(&path).unwrap();
        assert_eq!(on_disk.len(), 2);
    }

    #[test]
    fn test_open_corrupt_file_fails_open() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_RESULTS_FILE);
        fs::write(&path, "{not json").unwrap();

        let store = Store::open(&path);
        assert!(store.is_empty());

        let backup = temp.path().join(format!("{}.corrupt", DEFAULT_RESULTS_FILE));
        assert!(backup.exists());
        assert_eq!(fs::read_to_string(backup).unwrap(), "{not json");
    }

    #[test]
    fn test_open_wrong_shape_fails_open() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_RESULTS_FILE);
        fs::write(&path, r#"[{"platform": "Toptal", "category": "x"}]"#).unwrap();

        let store = Store::open(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_after_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_RESULTS_FILE);
        fs::write(&path, "truncated [").unwrap();

        let mut store = Store::open(&path);
        store.append(record(Platform::Fiverr, "fresh")).unwrap();

        let reopened = Store::open(&path);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.all()[0].title, "fresh");
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let temp = TempDir::new().unwrap();
        // A regular file where the parent directory should be makes every rewrite fail
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let path = blocker.join(DEFAULT_RESULTS_FILE);

        let mut store = Store::open(&path);
        let result = store.append(record(Platform::Fiverr, "lost"));

        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_append_keeps_saved_history() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_RESULTS_FILE);

        let mut store = Store::open(&path);
        store.append(record(Platform::Fiverr, "saved")).unwrap();
        let before = fs::read(&path).unwrap();

        // Occupy the staging slot so the next rewrite fails partway
        fs::create_dir(json::temp_path(&path)).unwrap();
        let mut large = record(Platform::Upwork, "large");
        large.description = "d".repeat(4000);
        assert!(store.append(large).is_err());
        assert_eq!(store.len(), 1);

        assert_eq!(fs::read(&path).unwrap(), before);
        let reopened = Store::open(&path);
        assert_eq!(reopened.all(), store.all());
        assert!(!temp.path().join(format!("{}.corrupt", DEFAULT_RESULTS_FILE)).exists());
    }

    #[test]
    fn test_repeated_corruption_keeps_every_backup() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_RESULTS_FILE);

        fs::write(&path, "first garbage").unwrap();
        assert!(Store::open(&path).is_empty());
        fs::write(&path, "second garbage").unwrap();
        assert!(Store::open(&path).is_empty());
        fs::write(&path, "third garbage").unwrap();
        assert!(Store::open(&path).is_empty());

        let backup = |suffix: &str| temp.path().join(format!("{}.corrupt{}", DEFAULT_RESULTS_FILE, suffix));
        assert_eq!(fs::read_to_string(backup("")).unwrap(), "first garbage");
        assert_eq!(fs::read_to_string(backup(".2")).unwrap(), "second garbage");
        assert_eq!(fs::read_to_string(backup(".3")).unwrap(), "third garbage");
        assert!(!path.exists());
    }
}
