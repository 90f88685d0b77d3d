use std::{fs::{self, File}, io::Write, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Write-then-rename wrapper, so a failed run never leaves a half-written output behind.
pub(crate) struct PendingWrite {
    target: PathBuf,
    tmp: Option<NamedTempFile>,
}

impl PendingWrite {
    /// Open a temp file next to `target`, creating parent directories as needed.
    pub(crate) fn open(target: &Path) -> Result<Self> {
        let parent = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        ensure_dir_exists(parent)?;
        let tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("create temp file in {}", parent.display()))?;

        Ok(Self { target: target.to_path_buf(), tmp: Some(tmp) })
    }

    /// Flush, fsync (best effort) and move the temp file onto the target path.
    pub(crate) fn finalize(mut self) -> Result<()> {
        let mut tmp = self.tmp.take().context("pending write already finalized")?;
        tmp.flush().with_context(|| format!("flush {}", self.target.display()))?;
        tmp.as_file().sync_all().ok();
        tmp.persist(&self.target)
            .with_context(|| format!("rename to {}", self.target.display()))?;
        if let Some(dir) = self.target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            let _ = File::open(dir).and_then(|f| f.sync_all());
        }
        Ok(())
    }

    fn file(&mut self) -> std::io::Result<&mut NamedTempFile> {
        self.tmp.as_mut().ok_or_else(|| std::io::Error::other("pending write already finalized"))
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file()?.write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.file()?.flush()
    }
}

/// Atomically replace `path` with `bytes`.
pub(crate) fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut sink = PendingWrite::open(path)?;
    sink.write_all(bytes).with_context(|| format!("write {}", path.display()))?;
    sink.finalize()
}
