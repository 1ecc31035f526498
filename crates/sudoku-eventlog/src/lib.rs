//! Append-only event log (C8): one JSONL line per event, partitioned by UTC
//! date and rotated once a segment crosses `max_bytes`.
//!
//! Layout: `<root>/logs/<category>/<YYYYMMDD>/<category>_<NN>.jsonl`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;

#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to canonicalize event: {0}")]
    Canonicalize(#[from] sudoku_codec::CodecError),
}

pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;

struct Cursor {
    date: String,
    segment: u32,
}

/// A single logical append target (e.g. `"shadow"`). One `EventLog` per
/// category; callers share it behind an `Arc` across worker threads.
pub struct EventLog {
    root: Utf8PathBuf,
    category: String,
    max_bytes: u64,
    cursor: Mutex<Option<Cursor>>,
}

impl EventLog {
    pub fn new(root: impl Into<Utf8PathBuf>, category: impl Into<String>) -> Self {
        Self::with_max_bytes(root, category, DEFAULT_MAX_BYTES)
    }

    pub fn with_max_bytes(root: impl Into<Utf8PathBuf>, category: impl Into<String>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            category: category.into(),
            max_bytes,
            cursor: Mutex::new(None),
        }
    }

    fn category_dir(&self, date: &str) -> Utf8PathBuf {
        self.root.join("logs").join(&self.category).join(date)
    }

    /// Append one JSON value as a canonical single-line JSONL record.
    /// Returns the path the line was written to.
    pub fn append(&self, value: &serde_json::Value) -> Result<Utf8PathBuf, EventLogError> {
        let date = Utc::now().format("%Y%m%d").to_string();
        let mut line = sudoku_codec::canonicalize(value)?;
        line.push(b'\n');

        let mut guard = self.cursor.lock().expect("event log mutex poisoned");
        let dir = self.category_dir(&date);
        fs::create_dir_all(&dir).map_err(|source| EventLogError::Io {
            path: dir.clone(),
            source,
        })?;

        let needs_new_cursor = match guard.as_ref() {
            Some(cursor) => cursor.date != date,
            None => true,
        };
        if needs_new_cursor {
            let segment = latest_segment(&dir, &self.category)?;
            *guard = Some(Cursor { date, segment });
        }

        let cursor = guard.as_mut().expect("cursor initialized above");
        let mut path = segment_path(&dir, &self.category, cursor.segment);
        let current_len = path_len(&path)?;
        if current_len > 0 && current_len + line.len() as u64 > self.max_bytes {
            cursor.segment += 1;
            path = segment_path(&dir, &self.category, cursor.segment);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_std_path())
            .map_err(|source| EventLogError::Io {
                path: path.clone(),
                source,
            })?;
        file.write_all(&line).map_err(|source| EventLogError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path, "appended event log line");
        Ok(path)
    }
}

fn path_len(path: &Utf8Path) -> Result<u64, EventLogError> {
    match fs::metadata(path.as_std_path()) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(source) => Err(EventLogError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn segment_path(dir: &Utf8Path, category: &str, segment: u32) -> Utf8PathBuf {
    dir.join(format!("{category}_{segment:02}.jsonl"))
}

fn latest_segment(dir: &Utf8Path, category: &str) -> Result<u32, EventLogError> {
    let prefix = format!("{category}_");
    let mut max_segment = 0u32;
    let entries = match fs::read_dir(dir.as_std_path()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(source) => {
            return Err(EventLogError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };
    for entry in entries {
        let entry = entry.map_err(|source| EventLogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if let Some(name) = entry.file_name().to_str() {
            if let Some(stripped) = name.strip_prefix(&prefix).and_then(|s| s.strip_suffix(".jsonl")) {
                if let Ok(n) = stripped.parse::<u32>() {
                    max_segment = max_segment.max(n);
                }
            }
        }
    }
    Ok(max_segment)
}
