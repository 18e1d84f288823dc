use snapsolve_types::CycleOutcome;

/// Counters for the current session
#[derive(Clone, Debug, Default)]
pub struct SessionStatus {
    pub cycles: u64,
    pub answered: u64,
    pub failed: u64,
    pub timed_out: u64,
    /// Activations dropped because a cycle was running
    pub rejected: u64,
}

impl SessionStatus {
    pub fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        match outcome {
            CycleOutcome::Answered(_) => self.answered += 1,
            CycleOutcome::TimedOut(_) => self.timed_out += 1,
            _ => self.failed += 1,
        }
    }

    pub fn record_rejected(&mut self) {
        self.rejected += 1;
    }
}
