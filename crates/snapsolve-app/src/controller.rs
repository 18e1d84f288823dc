use std::io::Stdout;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::console::Console;
use crate::events::{AppEvent, event_loop};
use crate::io::hotkey_listener;
use crate::pipeline::Pipeline;
use crate::state::AppState;

/// One pending trigger at most; the gate rejects the rest
const EVENT_QUEUE_CAPACITY: usize = 1;

/// Application controller for task spawning and lifecycle
pub struct AppController {
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Register the hotkey, then start the event loop.
    ///
    /// Fails without starting the event loop if the hotkey cannot be registered.
    pub async fn spawn_tasks(
        &self,
        pipeline: Pipeline,
        console: Console<Stdout>,
    ) -> anyhow::Result<JoinSet<anyhow::Result<()>>> {
        let mut tasks = JoinSet::new();
        let (event_tx, event_rx) = kanal::bounded_async::<AppEvent>(EVENT_QUEUE_CAPACITY);
        let (ready_tx, ready_rx) = oneshot::channel();

        // Hotkey listener
        let state = self.state.clone();
        let cancel = self.cancel_token.child_token();
        tasks.spawn_blocking(move || hotkey_listener(state, event_tx, cancel, ready_tx));

        ready_rx
            .await
            .context("Hotkey listener exited before registering")??;

        // Event loop
        tasks.spawn(event_loop(self.state.clone(), pipeline, console, event_rx));

        Ok(tasks)
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
