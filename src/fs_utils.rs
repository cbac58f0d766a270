use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

/// Replace `path` with `contents` without ever exposing a partially written file.
///
/// The data is written to a temporary file in the same directory, flushed to disk
/// and then renamed over the target. Parent directories are created if missing.
/// Blocking; callers on the async runtime go through [`write_atomic`].
pub fn write_atomic_blocking(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), bytes = contents.len(), "Wrote file atomically");
    Ok(())
}

/// Async wrapper around [`write_atomic_blocking`].
pub async fn write_atomic(path: &Path, contents: Vec<u8>) -> io::Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &contents))
        .await
        .map_err(io::Error::other)?
}
