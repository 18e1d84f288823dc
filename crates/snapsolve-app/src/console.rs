use std::io::{self, Stdout, Write};

use chrono::{DateTime, Local};

const BLUE: &str = "\x1b[94m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// Human-facing output. Logs go to stderr, this goes to stdout.
pub struct Console<W: Write> {
    out: W,
    color: bool,
}

impl Console<Stdout> {
    pub fn stdout(no_color: bool) -> Self {
        let color = !no_color && atty::is(atty::Stream::Stdout);
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn banner(&mut self, os: &str, shortcut: &str, model: &str) {
        self.line(&format!("Question analysis started on {os}"));
        self.line(&format!("Use {shortcut} to analyze a question"));
        self.line("The active window is captured and the correct answer printed below");
        self.line(&format!("Model used: {model}"));
    }

    pub fn cycle_started(&mut self, at: DateTime<Local>) {
        self.line("\n\n");
        self.line(&at.format("%H:%M:%S").to_string());
        self.line("");
    }

    pub fn status(&mut self, message: &str) {
        self.line(message);
    }

    /// Print the model reply exactly as given
    pub fn answer(&mut self, text: &str) {
        if self.color {
            self.line(&format!("{BLUE}{text}{RESET}"));
        } else {
            self.line(text);
        }
    }

    pub fn failure(&mut self, message: &str) {
        if self.color {
            self.line(&format!("{RED}{message}{RESET}"));
        } else {
            self.line(message);
        }
    }

    pub fn waiting(&mut self) {
        self.write("\nWaiting for screenshot... ");
    }

    fn line(&mut self, text: &str) {
        self.write(&format!("{text}\n"));
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
        {
            tracing::warn!("Failed to write to console: {}", e);
        }
    }
}
