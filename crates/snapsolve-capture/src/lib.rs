mod artifact;
mod capture;
mod hotkey;

pub use artifact::CaptureArtifact;
pub use capture::{CaptureError, CaptureSource, CapturedWindow, XcapCapture};
pub use hotkey::{HotkeyManager, parse_shortcut};
pub use image::RgbaImage;
