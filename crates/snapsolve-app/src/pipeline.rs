use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use snapsolve_answer::{AnswerService, follows_answer_format};
use snapsolve_capture::{CaptureArtifact, CaptureSource, CapturedWindow, RgbaImage};
use snapsolve_config::capture::CaptureConfig;
use snapsolve_types::CycleOutcome;

use crate::console::Console;

/// capture -> encode -> query -> print -> cleanup
pub struct Pipeline {
    capture: Arc<dyn CaptureSource>,
    answer: Arc<dyn AnswerService>,
    screenshot_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        capture: Arc<dyn CaptureSource>,
        answer: Arc<dyn AnswerService>,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            capture,
            answer,
            screenshot_dir: config.screenshot_dir.clone(),
        }
    }

    pub fn model(&self) -> &str {
        self.answer.model()
    }

    /// Run one full cycle. Every failure is reported and turned into an outcome.
    pub async fn run_cycle<W: Write + Send>(&self, console: &mut Console<W>) -> CycleOutcome {
        console.cycle_started(Local::now());
        console.status("Taking screenshot...");

        let window = match self.capture_window().await {
            Ok(window) => window,
            Err(e) => {
                tracing::error!(">>> [CAPTURE] Failed: {}", e);
                console.failure("Screenshot failed");
                return CycleOutcome::CaptureFailed(e);
            }
        };
        tracing::debug!(">>> [CAPTURE] '{}' ({})", window.title, window.bounds);

        let (artifact, png) = match self.encode(window.image).await {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(">>> [ENCODE] Failed: {}", e);
                console.failure(&format!("Error processing image: {e}"));
                return CycleOutcome::EncodeFailed(e);
            }
        };
        tracing::debug!(
            ">>> [ENCODE] {} ({} bytes)",
            artifact.path().display(),
            png.len()
        );

        console.status("Analyzing question...");
        let outcome = match self.answer.answer(&png).await {
            Ok(reply) => {
                let reply = reply.trim().to_string();
                if !follows_answer_format(&reply) {
                    tracing::warn!("Reply does not follow the question/answer format");
                }
                console.answer(&reply);
                CycleOutcome::Answered(reply)
            }
            Err(e) if e.is_timeout() => {
                tracing::error!(">>> [ANSWER] {}", e);
                console.failure("Failed to analyze question: request timed out");
                CycleOutcome::TimedOut(e.to_string())
            }
            Err(e) => {
                tracing::error!(">>> [ANSWER] {}", e);
                console.failure("Failed to analyze question");
                CycleOutcome::ServiceFailed(e.to_string())
            }
        };

        let path = artifact.path().to_path_buf();
        if let Err(e) = artifact.discard() {
            tracing::warn!("Error deleting screenshot {}: {}", path.display(), e);
        }

        outcome
    }

    async fn capture_window(&self) -> Result<CapturedWindow, String> {
        let capture = self.capture.clone();
        match tokio::task::spawn_blocking(move || capture.capture_active_window()).await {
            Ok(Ok(window)) => Ok(window),
            Ok(Err(e)) => Err(e.to_string()),
            Err(e) => Err(format!("capture task error: {e}")),
        }
    }

    /// Persist to the transient file and read the PNG bytes back
    async fn encode(&self, image: RgbaImage) -> Result<(CaptureArtifact, Vec<u8>), String> {
        let dir = self.screenshot_dir.clone();
        let result = tokio::task::spawn_blocking(move || {
            let artifact = CaptureArtifact::persist(&dir, &image)?;
            let png = artifact.read_bytes()?;
            Ok::<_, anyhow::Error>((artifact, png))
        })
        .await;

        match result {
            Ok(Ok(encoded)) => Ok(encoded),
            Ok(Err(e)) => Err(format!("{e:#}")),
            Err(e) => Err(format!("encode task error: {e}")),
        }
    }
}
