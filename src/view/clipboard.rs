/// Seam between the view and whatever clipboard the host provides, so the
/// presentation layer stays testable off-desktop.
pub trait ClipboardSink {
    fn set_text(&mut self, text: String) -> Result<(), String>;
}

/// System clipboard backed by `arboard`. The handle is acquired per write;
/// on headless hosts acquisition fails and the caller logs it.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: String) -> Result<(), String> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text))
            .map_err(|e| e.to_string())
    }
}

/// In-memory sink for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub text: Option<String>,
    pub fail: bool,
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: String) -> Result<(), String> {
        if self.fail {
            return Err("clipboard unavailable".to_string());
        }
        self.text = Some(text);
        Ok(())
    }
}
