use std::io::Write;
use std::sync::Arc;

use kanal::AsyncReceiver;
use snapsolve_types::CycleOutcome;

use crate::console::Console;
use crate::pipeline::Pipeline;
use crate::state::{AppState, GatePermit};

#[derive(Debug)]
pub enum AppEvent {
    /// Hotkey pressed; the permit keeps the gate in Processing
    Trigger(GatePermit),
}

/// App's main loop. Returns once every event sender is gone.
pub async fn event_loop<W: Write + Send>(
    state: Arc<AppState>,
    pipeline: Pipeline,
    mut console: Console<W>,
    events_rx: AsyncReceiver<AppEvent>,
) -> anyhow::Result<()> {
    console.waiting();

    while let Ok(event) = events_rx.recv().await {
        match event {
            AppEvent::Trigger(permit) => {
                tracing::info!("Hotkey triggered, starting cycle");
                let outcome = pipeline.run_cycle(&mut console).await;
                log_outcome(&outcome);
                state.status.write().await.record(&outcome);
                drop(permit);
            }
        }
        console.waiting();
    }

    tracing::info!("Event channel closed, leaving event loop");
    Ok(())
}

fn log_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Answered(reply) => tracing::info!("Cycle answered ({} chars)", reply.len()),
        CycleOutcome::CaptureFailed(e) => tracing::warn!("Cycle ended at capture: {}", e),
        CycleOutcome::EncodeFailed(e) => tracing::warn!("Cycle ended at encode: {}", e),
        CycleOutcome::ServiceFailed(e) => tracing::warn!("Cycle ended at service: {}", e),
        CycleOutcome::TimedOut(e) => tracing::warn!("Cycle timed out: {}", e),
    }
}
