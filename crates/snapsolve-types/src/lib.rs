pub mod types;

pub use types::{ControllerState, CycleOutcome, WindowBounds};
