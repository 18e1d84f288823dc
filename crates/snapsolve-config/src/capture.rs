use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CaptureConfig {
    /// Where transient screenshots are written before upload
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

impl CaptureConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            screenshot_dir: lookup("SCREENSHOT_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_screenshot_dir),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            screenshot_dir: default_screenshot_dir(),
        }
    }
}
