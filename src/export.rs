// Listings and snapshot exports over the record store

use crate::filter::PlatformFilter;
use crate::json;
use crate::record::GeneratedRecord;
use crate::store::Store;
use chrono::{DateTime, Local};
use eyre::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Column headers of a listing, in display order
pub const COLUMNS: [&str; 7] = ["Platform", "Category", "Title", "Description", "Tags", "Pricing", "Timestamp"];

/// Field names written in the CSV header; same names and order as the persisted JSON
pub const CSV_HEADER: [&str; 7] = [
    "platform",
    "category",
    "title",
    "description",
    "hashtags",
    "pricing",
    "timestamp",
];

/// Default export file prefix
pub const DEFAULT_EXPORT_PREFIX: &str = "freelanceboost";

/// Status reported when there is nothing to export
pub const NOTHING_TO_EXPORT: &str = "No results to export yet. Generate some gigs or proposals first!";

const EXPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub type Row = [String; 7];

/// Tabular projection of records in `COLUMNS` order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsTable {
    rows: Vec<Row>,
}

impl ResultsTable {
    pub fn columns(&self) -> &'static [&'static str; 7] {
        &COLUMNS
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Serializes as an array of objects keyed by column, keys in `COLUMNS` order
impl Serialize for ResultsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows.iter().map(RowObject))
    }
}

struct RowObject<'a>(&'a Row);

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(COLUMNS.len()))?;
        for (column, value) in COLUMNS.iter().zip(self.0) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

fn project(record: &GeneratedRecord) -> Row {
    [
        record.platform.to_string(),
        record.category.clone(),
        record.title.clone(),
        record.description.clone(),
        record.tags.clone(),
        record.pricing.clone(),
        record.timestamp.clone(),
    ]
}

/// Records matching `filter`, in store order
pub fn filter_records<'a>(store: &'a Store, filter: &'a PlatformFilter) -> impl Iterator<Item = &'a GeneratedRecord> {
    store.all().iter().filter(move |r| filter.matches(r))
}

/// List records matching `filter` as a table. Never fails; no matches gives an empty table.
pub fn list(store: &Store, filter: &PlatformFilter) -> ResultsTable {
    ResultsTable {
        rows: filter_records(store, filter).map(project).collect(),
    }
}

/// Result of an export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Store was empty, no file written
    Empty,
    /// Snapshot written to `path`
    Written { path: PathBuf, count: usize },
}

impl ExportOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ExportOutcome::Empty => None,
            ExportOutcome::Written { path, .. } => Some(path.as_path()),
        }
    }

    /// Human-readable status line
    pub fn status(&self) -> String {
        match self {
            ExportOutcome::Empty => NOTHING_TO_EXPORT.to_string(),
            ExportOutcome::Written { count, .. } => format!("Successfully exported {} results", count),
        }
    }
}

/// Writes snapshot exports as `<prefix>_export_<YYYYMMDD_HHMMSS>.<ext>` under `dir`
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    prefix: String,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(".", DEFAULT_EXPORT_PREFIX)
    }
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Export every record as CSV
    pub fn export_csv(&self, store: &Store) -> Result<ExportOutcome> {
        self.export(store, "csv", || Ok(to_csv(store.all())))
    }

    /// Export every record as pretty-printed JSON
    pub fn export_json(&self, store: &Store) -> Result<ExportOutcome> {
        self.export(store, "json", || json::to_pretty_json(store.all()))
    }

    fn export<F>(&self, store: &Store, ext: &str, render: F) -> Result<ExportOutcome>
    where
        F: FnOnce() -> Result<String>,
    {
        if store.is_empty() {
            info!(format = ext, "Nothing to export");
            return Ok(ExportOutcome::Empty);
        }

        let content = render()?;
        let (path, mut file) = self.create_export_file(ext, Local::now())?;
        file.write_all(content.as_bytes())
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        file.sync_all()?;

        let count = store.len();
        info!(file = ?path, count, format = ext, "Exported results");
        Ok(ExportOutcome::Written { path, count })
    }

    /// Base file name for an export taken at `at`
    pub fn file_name(&self, ext: &str, at: DateTime<Local>) -> String {
        format!("{}_export_{}.{}", self.prefix, at.format(EXPORT_TIMESTAMP_FORMAT), ext)
    }

    /// Create a fresh export file; a name already taken within the same second gets `_2`, `_3`, ...
    fn create_export_file(&self, ext: &str, at: DateTime<Local>) -> Result<(PathBuf, File)> {
        std::fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("Failed to create export directory {}", self.dir.display()))?;

        let stamp = at.format(EXPORT_TIMESTAMP_FORMAT);
        let mut attempt = 1u32;
        loop {
            let name = if attempt == 1 {
                self.file_name(ext, at)
            } else {
                format!("{}_export_{}_{}.{}", self.prefix, stamp, attempt, ext)
            };
            let path = self.dir.join(name);

            match OpenOptions::new().create_new(true).write(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e).wrap_err_with(|| format!("Failed to create {}", path.display())),
            }
        }
    }
}

/// Render records as CSV with a header row
pub fn to_csv(records: &[GeneratedRecord]) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, CSV_HEADER.iter().copied());
    for record in records {
        push_csv_line(
            &mut out,
            [
                record.platform.as_str(),
                record.category.as_str(),
                record.title.as_str(),
                record.description.as_str(),
                record.tags.as_str(),
                record.pricing.as_str(),
                record.timestamp.as_str(),
            ],
        );
    }
    out
}

fn push_csv_line<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&csv_field(field));
    }
    out.push('\n');
}

/// Quote a field when it holds a comma, quote, or line break; embedded quotes are doubled
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
