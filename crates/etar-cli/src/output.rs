//! Temp-file-then-rename output
//!
//! The cipher streams into a hidden temp file beside the destination. Only a
//! successful run renames it into place; dropping an uncommitted
//! `AtomicOutput` deletes the temp file, so a failed decryption leaves no
//! unverified plaintext at the output path.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct AtomicOutput {
    target: PathBuf,
    temp: NamedTempFile,
}

impl AtomicOutput {
    pub fn create(target: &Path) -> Result<Self> {
        let dir = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let temp = tempfile::Builder::new()
            .prefix(".encrypt-tar-")
            .suffix(".partial")
            .tempfile_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;

        Ok(Self {
            target: target.to_path_buf(),
            temp,
        })
    }

    pub fn file_mut(&mut self) -> &mut File {
        self.temp.as_file_mut()
    }

    /// Sync and atomically move the temp file onto the target path.
    pub fn commit(self) -> Result<()> {
        self.temp
            .as_file()
            .sync_all()
            .context("syncing output")?;
        self.temp
            .persist(&self.target)
            .map_err(|e| e.error)
            .with_context(|| format!("writing output: {}", self.target.display()))?;
        Ok(())
    }
}
