use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

pub const COPIED_INDICATOR: Duration = Duration::from_millis(2000);

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Platform clipboard. Writes are advisory; callers never surface failures.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Process-local clipboard holding the last written text.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}

/// Per-item "copied" indicators. Each item reverts on its own timer, so a
/// copy of one address never shortens or extends another's indicator.
#[derive(Debug)]
pub struct CopyTracker {
    window: Duration,
    copied_at: Mutex<HashMap<String, Instant>>,
}

impl Default for CopyTracker {
    fn default() -> Self {
        Self::new(COPIED_INDICATOR)
    }
}

impl CopyTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            copied_at: Mutex::new(HashMap::new()),
        }
    }

    pub fn mark(&self, item: &str) {
        if let Ok(mut map) = self.copied_at.lock() {
            let now = Instant::now();
            map.retain(|_, at| now.duration_since(*at) < self.window);
            map.insert(item.to_string(), now);
        }
    }

    pub fn is_copied(&self, item: &str) -> bool {
        self.copied_at
            .lock()
            .ok()
            .and_then(|map| map.get(item).copied())
            .is_some_and(|at| at.elapsed() < self.window)
    }
}

/// Fire-and-forget copy: on success the item's indicator turns on, on
/// failure the error is logged and the indicator is left untouched.
pub async fn copy_to_clipboard(clipboard: &dyn Clipboard, tracker: &CopyTracker, text: &str) -> bool {
    match clipboard.write_text(text).await {
        Ok(()) => {
            tracker.mark(text);
            metrics::counter!("clipboard_writes_total", "outcome" => "ok").increment(1);
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not copy to clipboard");
            metrics::counter!("clipboard_writes_total", "outcome" => "failed").increment(1);
            false
        }
    }
}
