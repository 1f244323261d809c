//! File lifecycle for written PDFs and the seen-links file.
//!
//! Data goes to a `.part` file first and is renamed into place, so a crash or
//! a failed request never leaves a truncated PDF under its final name. Temp
//! names are unique per write, so concurrent writers never share one.
//!
//! PDFs never replace an existing file: [`write_pdf`] claims its final name
//! with `create_new` and moves to `name-2.pdf`, `name-3.pdf`, … when taken.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::checksum;
use crate::url_model;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Upper bound on `-N` suffixes tried for one PDF name.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Temp file next to `final_path`: `.<name>.<pid>-<seq>.part`, unique within
/// the process and across processes.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let temp = format!(".{}.{}-{}{}", name, std::process::id(), seq, TEMP_SUFFIX);
    final_path.with_file_name(temp)
}

/// Write `data` to `final_path` via a synced temp file and rename, replacing
/// any existing file. Creates the parent directory. Returns the number of
/// bytes written. The temp file is removed on every failure path.
pub fn write_atomic(final_path: &Path, data: &[u8]) -> Result<u64> {
    if let Some(parent) = final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let tp = temp_path(final_path);
    let result = write_then_rename(&tp, final_path, data);
    if result.is_err() {
        let _ = fs::remove_file(&tp);
    }
    result
}

fn write_then_rename(tp: &Path, final_path: &Path, data: &[u8]) -> Result<u64> {
    let mut f = fs::File::create(tp).with_context(|| format!("create {}", tp.display()))?;
    f.write_all(data).with_context(|| format!("write {}", tp.display()))?;
    f.sync_all().context("storage sync failed")?;
    drop(f);
    fs::rename(tp, final_path).with_context(|| {
        format!("failed to rename {} to {}", tp.display(), final_path.display())
    })?;
    Ok(data.len() as u64)
}

/// A PDF that landed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPdf {
    pub path: PathBuf,
    /// Name actually used; differs from the requested one after a collision.
    pub filename: String,
    pub size: u64,
    pub sha256: String,
}

/// Write a PDF body under `dir`, named `filename` or the first free
/// `filename-N` variant, and checksum it.
pub fn write_pdf(dir: &Path, filename: &str, data: &[u8]) -> Result<WrittenPdf> {
    fs::create_dir_all(dir).with_context(|| format!("create dir: {}", dir.display()))?;
    let (path, filename) = claim_name(dir, filename)?;
    let size = match write_atomic(&path, data) {
        Ok(size) => size,
        Err(e) => {
            // Release the claimed (empty) name.
            let _ = fs::remove_file(&path);
            return Err(e);
        }
    };
    tracing::info!(path = %path.display(), size, "saved PDF");
    Ok(WrittenPdf {
        path,
        filename,
        size,
        sha256: checksum::sha256_bytes(data),
    })
}

/// Create an empty placeholder at the first free name. The placeholder is
/// what makes the name ours; the rename in [`write_atomic`] replaces it.
fn claim_name(dir: &Path, filename: &str) -> Result<(PathBuf, String)> {
    for n in 1..=MAX_NAME_ATTEMPTS {
        let candidate = if n == 1 {
            filename.to_string()
        } else {
            url_model::numbered_filename(filename, n)
        };
        let path = dir.join(&candidate);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                if n > 1 {
                    tracing::debug!(requested = filename, used = %candidate, "name taken, using next free");
                }
                return Ok((path, candidate));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e).with_context(|| format!("create {}", path.display())),
        }
    }
    bail!("no free file name for {} in {}", filename, dir.display())
}
