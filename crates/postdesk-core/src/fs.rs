//! Filesystem utilities for atomic operations.

use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{PostdeskError, Result};

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// On some platforms (notably Windows), `fs::rename` fails if the destination already exists.
/// This function handles that case by removing the destination first and retrying.
///
/// If the rename ultimately fails, the temp file is cleaned up.
pub fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

/// Write `data` to `path` through a synced temp file in the same directory.
///
/// Readers either see the previous file or the complete new one. Missing
/// parent directories are created.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    write_atomic_with(path, |file| file.write_all(data))
}

/// Like [`write_atomic`], but `write` fills the temp file.
///
/// The temp file is removed if writing, syncing or renaming fails, and
/// `path` is left as it was.
pub fn write_atomic_with<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| {
        PostdeskError::Persistence(format!(
            "Failed to create directory {}: {}",
            parent.display(),
            e
        ))
    })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| PostdeskError::Persistence(format!("System time error: {}", e)))?
        .as_nanos();
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PostdeskError::InvalidInput(format!("Invalid file name: {}", path.display())))?;
    let temp_path = parent.join(format!(".{}.{}.tmp", filename, nanos));

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(|e| PostdeskError::Persistence(format!("Temp file create failed: {}", e)))?;
    let filled = write(&mut file)
        .map_err(|e| PostdeskError::Persistence(format!("Temp file write failed: {}", e)))
        .and_then(|()| {
            file.sync_all()
                .map_err(|e| PostdeskError::Persistence(format!("Temp file sync failed: {}", e)))
        });
    drop(file);
    if let Err(e) = filled {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    rename_with_fallback(&temp_path, path)?;
    Ok(())
}
