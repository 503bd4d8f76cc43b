// JSON file operations

use eyre::{Context, Result};
use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read and parse a whole JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).wrap_err_with(|| format!("Failed to parse JSON in {}", path.display()))
}

/// Serialize with 2-space indentation
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize JSON")
}

/// Sibling file that a rewrite of `path` is staged in
pub fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Replace the contents of `path` with `value`, pretty-printed
///
/// The document is written to a sibling `.tmp` file under an exclusive lock, synced, then
/// renamed over `path`. Any failure before the rename leaves the previous contents of `path`
/// untouched.
pub fn rewrite_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = to_pretty_json(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).wrap_err_with(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)
        .wrap_err_with(|| format!("Failed to open {} for writing", tmp.display()))?;

    let staged = write_locked(&mut file, json.as_bytes()).and_then(|()| {
        fs::rename(&tmp, path).wrap_err_with(|| format!("Failed to replace {} with {}", path.display(), tmp.display()))
    });
    if let Err(e) = staged {
        drop(file);
        if let Err(cleanup) = fs::remove_file(&tmp) {
            warn!(file = ?tmp, error = %cleanup, "Failed to remove staged file");
        }
        return Err(e);
    }

    debug!(file = ?path, bytes = json.len(), "Rewrote JSON file");

    // Lock is released when file is dropped
    Ok(())
}

fn write_locked(file: &mut File, bytes: &[u8]) -> Result<()> {
    file.lock_exclusive().context("Failed to acquire file lock")?;
    file.write_all(bytes).context("Failed to write JSON")?;
    file.sync_all().context("Failed to sync JSON")?; // Ensure data is flushed to disk
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{GeneratedRecord, Platform};
    use tempfile::TempDir;

    fn sample(title: &str) -> GeneratedRecord {
        GeneratedRecord {
            platform: Platform::Fiverr,
            category: "Logo Design".to_string(),
            title: title.to_string(),
            description: "## Heading\n\nBody, with a comma".to_string(),
            tags: "#LogoDesign, #FreelanceServices".to_string(),
            pricing: "50-150".to_string(),
            timestamp: "2024-03-05 08:09:10".to_string(),
        }
    }

    #[test]
    fn test_rewrite_and_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.json");

        let records = vec![sample("one"), sample("two")];
        rewrite_json(&path, &records).unwrap();

        let loaded: Vec<GeneratedRecord> = read_json(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_rewrite_is_pretty_printed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.json");

        rewrite_json(&path, &vec![sample("one")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n  {\n    \""));
        assert!(content.contains("\"hashtags\": \"#LogoDesign, #FreelanceServices\""));
    }

    #[test]
    fn test_rewrite_shrinks_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.json");

        rewrite_json(&path, &vec![sample("one"), sample("two"), sample("three")]).unwrap();
        rewrite_json(&path, &vec![sample("only")]).unwrap();

        let loaded: Vec<GeneratedRecord> = read_json(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "only");
    }

    #[test]
    fn test_rewrite_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("results.json");

        rewrite_json(&path, &Vec::<GeneratedRecord>::new()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_read_nonexistent_file() {
        let temp = TempDir::new().unwrap();
        let result: Result<Vec<GeneratedRecord>> = read_json(&temp.path().join("missing.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_read_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.json");
        fs::write(&path, "[{\"platform\": \"Fiverr\",").unwrap();

        let result: Result<Vec<GeneratedRecord>> = read_json(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_rewrite_leaves_no_staged_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.json");

        rewrite_json(&path, &vec![sample("one")]).unwrap();
        rewrite_json(&path, &vec![sample("one"), sample("two")]).unwrap();

        assert!(!temp_path(&path).exists());
        let names: Vec<_> = fs::read_dir(temp.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names, vec![std::ffi::OsString::from("results.json")]);
    }

    #[test]
    fn test_failed_rewrite_keeps_previous_contents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.json");

        rewrite_json(&path, &vec![sample("kept")]).unwrap();
        let before = fs::read(&path).unwrap();

        // A directory in the staging slot makes the write fail before the target is touched
        fs::create_dir(temp_path(&path)).unwrap();
        let big = sample(&"x".repeat(4000));
        assert!(rewrite_json(&path, &vec![sample("kept"), big]).is_err());

        assert_eq!(fs::read(&path).unwrap(), before);
        let loaded: Vec<GeneratedRecord> = read_json(&path).unwrap();
        assert_eq!(loaded, vec![sample("kept")]);
    }
}
