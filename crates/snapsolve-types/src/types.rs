use std::fmt;

use serde::{Deserialize, Serialize};

/// Screen geometry of a captured window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for WindowBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Processing,
}

/// How a single capture/query cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Trimmed model reply, printed as-is
    Answered(String),
    CaptureFailed(String),
    EncodeFailed(String),
    ServiceFailed(String),
    TimedOut(String),
}
