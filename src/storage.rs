//! Shared JSON array files with crash-safe atomic replacement.

use std::{
    fs,
    io::Write,
    path::Path,
};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;

/// Files above this size are treated as empty rather than loaded.
pub const MAX_STORE_BYTES: u64 = 2_000_000;

/// Read a JSON array file leniently.
///
/// A missing file, unreadable or non-array JSON, and a file over
/// [`MAX_STORE_BYTES`] all come back as an empty list. Corrupt state on
/// disk must never keep a reader, or the append that follows, from
/// proceeding.
pub fn read_list(path: &Path) -> Vec<Value> {
    let Ok(meta) = fs::metadata(path) else {
        return Vec::new();
    };
    if meta.len() > MAX_STORE_BYTES {
        return Vec::new();
    }
    let Ok(data) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(&data) {
        Ok(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Atomically replace `path` with the JSON serialization of `value`.
///
/// The payload goes to a temporary file in the target's own directory
/// (same filesystem, so the final step is an atomic rename), gets flushed
/// and synced to stable storage, then renamed over the target. On any
/// failure the temporary file is removed on drop and the target keeps its
/// previous contents.
pub fn replace_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Append one record to the array file at `path`.
///
/// Read-append-rewrite; every append re-reads the file, there is no cache
/// across calls. Concurrent writers are not coordinated: two racing appends
/// can lose one record (last replace wins), accepted at this store's write
/// volume.
pub fn append<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let mut items = read_list(path);
    items.push(serde_json::to_value(record)?);
    replace_atomic(path, &items)
}
