//! Fakes shared by the controller tests

use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use snapsolve_answer::{AnswerError, AnswerService};
use snapsolve_capture::{CaptureError, CaptureSource, CapturedWindow, RgbaImage};
use snapsolve_config::capture::CaptureConfig;
use snapsolve_types::WindowBounds;

use crate::console::Console;
use crate::pipeline::Pipeline;

pub struct FakeCapture {
    pub has_window: bool,
}

impl CaptureSource for FakeCapture {
    fn capture_active_window(&self) -> Result<CapturedWindow, CaptureError> {
        if !self.has_window {
            return Err(CaptureError::NoActiveWindow);
        }
        Ok(CapturedWindow {
            title: "Quiz".to_string(),
            bounds: WindowBounds {
                x: 0,
                y: 0,
                width: 8,
                height: 6,
            },
            image: RgbaImage::new(8, 6),
        })
    }
}

/// Replays scripted replies and records what it saw
pub struct FakeAnswer {
    replies: Mutex<VecDeque<Result<String, AnswerError>>>,
    pub calls: AtomicUsize,
    pub payloads: Mutex<Vec<Vec<u8>>>,
    /// PNG files present in the screenshot dir during each call
    pub files_during_call: Mutex<Vec<usize>>,
    watch_dir: PathBuf,
}

impl FakeAnswer {
    pub fn new(watch_dir: &Path, replies: Vec<Result<String, AnswerError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
            files_during_call: Mutex::new(Vec::new()),
            watch_dir: watch_dir.to_path_buf(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AnswerService for FakeAnswer {
    async fn answer(&self, png: &[u8]) -> Result<String, AnswerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(png.to_vec());
        self.files_during_call
            .lock()
            .unwrap()
            .push(png_count(&self.watch_dir));

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AnswerError::EmptyResponse("script exhausted".into())))
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

pub fn png_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "png"))
                .count()
        })
        .unwrap_or(0)
}

pub fn pipeline(capture: FakeCapture, answer: Arc<FakeAnswer>, dir: &Path) -> Pipeline {
    let config = CaptureConfig {
        screenshot_dir: dir.to_path_buf(),
    };
    Pipeline::new(Arc::new(capture), answer, &config)
}

/// Console sink that stays readable after being moved into a task
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn console(&self) -> Console<SharedBuf> {
        Console::new(self.clone(), false)
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
