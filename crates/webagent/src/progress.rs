//! Terminal spinner shown while the agent waits

use std::io::{stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;

const CLEAR_LINE: &str = "\x1b[2K\r";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const CYAN: &str = "\x1b[96m";
const RESET: &str = "\x1b[0m";

const UNICODE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ASCII_FRAMES: &[&str] = &["|", "/", "-", "\\"];

const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Animated one-line status, cleared when stopped
pub struct Spinner {
    message: String,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    frames: &'static [&'static str],
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
            frames: if supports_unicode() {
                UNICODE_FRAMES
            } else {
                ASCII_FRAMES
            },
        }
    }

    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let running = self.running.clone();
        let message = self.message.clone();
        let frames = self.frames;

        self.handle = Some(tokio::spawn(async move {
            let mut tick = interval(FRAME_INTERVAL);
            let mut out = stdout();
            let _ = write!(out, "{}", HIDE_CURSOR);

            for frame in frames.iter().cycle() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let _ = write!(out, "{}{}{} {}{}", CLEAR_LINE, CYAN, frame, message, RESET);
                let _ = out.flush();
                tick.tick().await;
            }

            let _ = write!(out, "{}{}", CLEAR_LINE, SHOW_CURSOR);
            let _ = out.flush();
        }));
    }

    /// Stop and clear the line
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        print!("{}", SHOW_CURSOR);
        let _ = stdout().flush();
    }
}

fn supports_unicode() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term.contains("xterm") || term.contains("256color") || term.contains("kitty") {
            return true;
        }
    }

    ["LC_ALL", "LC_CTYPE", "LANG"].iter().any(|var| {
        std::env::var(var)
            .map(|v| v.to_lowercase().contains("utf"))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spinner_start_stop() {
        let mut spinner = Spinner::new("Waiting");
        assert!(spinner.handle.is_none());

        spinner.start();
        assert!(spinner.running.load(Ordering::SeqCst));
        tokio::time::sleep(Duration::from_millis(100)).await;

        spinner.stop().await;
        assert!(!spinner.running.load(Ordering::SeqCst));
        assert!(spinner.handle.is_none());
    }

    #[tokio::test]
    async fn test_double_start_is_noop() {
        let mut spinner = Spinner::new("Waiting");
        spinner.start();
        spinner.start();
        spinner.stop().await;
    }
}
