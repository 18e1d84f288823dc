use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use snapsolve_config::Config;
use snapsolve_types::ControllerState;
use tokio::sync::RwLock;

use crate::status::SessionStatus;

pub struct AppState {
    pub config: Arc<Config>,
    pub gate: Arc<TriggerGate>,
    pub status: Arc<RwLock<SessionStatus>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            gate: Arc::new(TriggerGate::new()),
            status: Arc::new(RwLock::new(SessionStatus::default())),
        }
    }
}

/// Single-slot Idle/Processing gate, at most one cycle in flight
#[derive(Debug, Default)]
pub struct TriggerGate {
    processing: AtomicBool,
}

impl TriggerGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move Idle -> Processing, or `None` if a cycle is already running
    pub fn try_acquire(self: &Arc<Self>) -> Option<GatePermit> {
        self.processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GatePermit { gate: self.clone() })
    }

    pub fn state(&self) -> ControllerState {
        if self.processing.load(Ordering::Acquire) {
            ControllerState::Processing
        } else {
            ControllerState::Idle
        }
    }
}

/// Held for the duration of one cycle; dropping it returns the gate to Idle
#[derive(Debug)]
pub struct GatePermit {
    gate: Arc<TriggerGate>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.gate.processing.store(false, Ordering::Release);
    }
}
