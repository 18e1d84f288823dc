use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use snapsolve_capture::HotkeyManager;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::events::AppEvent;
use crate::state::AppState;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Blocking hotkey listener. Run on a dedicated blocking thread.
///
/// Reports registration success or failure through `ready` before entering
/// the poll loop, then forwards presses until `cancel` fires or the event
/// loop goes away.
pub fn hotkey_listener(
    state: Arc<AppState>,
    event_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
    ready: oneshot::Sender<anyhow::Result<()>>,
) -> anyhow::Result<()> {
    let shortcut = state.config.hotkey.shortcut.clone();

    let hotkey_manager = match HotkeyManager::from_shortcut(&shortcut) {
        Ok(manager) => manager,
        Err(e) => {
            let message = format!("{e:#}");
            let _ = ready.send(Err(e));
            anyhow::bail!(message);
        }
    };
    tracing::info!("Hotkey registered ({})", hotkey_manager.shortcut());
    let _ = ready.send(Ok(()));

    while !cancel.is_cancelled() {
        if hotkey_manager.poll() && !on_press(&state, &event_tx) {
            break;
        }

        std::thread::sleep(POLL_INTERVAL);
    }

    tracing::info!("Hotkey listener stopping");
    Ok(())
}

/// Handle one hotkey press. Returns `false` once the event loop is gone.
///
/// Blocks on the status lock, so only call from a blocking thread.
pub(crate) fn on_press(state: &AppState, event_tx: &AsyncSender<AppEvent>) -> bool {
    match state.gate.try_acquire() {
        Some(permit) => match event_tx.try_send(AppEvent::Trigger(permit)) {
            Ok(true) => tracing::debug!("Hotkey pressed, cycle queued"),
            // The rejected event drops its permit, so the gate reopens
            Ok(false) => tracing::warn!("Event queue full, dropping hotkey press"),
            Err(_) => {
                tracing::info!("Event loop gone, stopping hotkey listener");
                return false;
            }
        },
        None => {
            tracing::warn!(
                "Still processing the previous screenshot ({:?}), ignoring {}",
                state.gate.state(),
                state.config.hotkey.shortcut
            );
            state.status.blocking_write().record_rejected();
        }
    }
    true
}
