use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use image::{ImageFormat, RgbaImage};

/// File name for a screenshot taken at `at`
pub fn artifact_file_name(at: DateTime<Local>) -> String {
    format!("screenshot_{}.png", at.format("%Y%m%d_%H%M%S"))
}

/// RAII guard for the transient screenshot file
///
/// The PNG lives on disk only for the duration of one cycle. Dropping the
/// guard removes it, even on early return or panic.
pub struct CaptureArtifact {
    path: PathBuf,
    removed: bool,
}

impl CaptureArtifact {
    /// Write `image` as PNG into `dir` under a timestamped name
    pub fn persist(dir: &Path, image: &RgbaImage) -> Result<Self> {
        let path = dir.join(artifact_file_name(Local::now()));

        // Owned from here on, so a partial write is cleaned up too
        let artifact = Self {
            path,
            removed: false,
        };

        image
            .save_with_format(&artifact.path, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", artifact.path.display()))?;

        tracing::debug!("Saved screenshot to {}", artifact.path.display());
        Ok(artifact)
    }

    /// Read the encoded PNG back from disk
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now and report failure to the caller
    pub fn discard(mut self) -> std::io::Result<()> {
        self.removed = true;
        remove_if_present(&self.path)
    }
}

impl Drop for CaptureArtifact {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove_if_present(&self.path) {
            tracing::warn!("Error deleting screenshot {}: {}", self.path.display(), e);
        }
    }
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
