/// Plan export — copying the displayed plan text to the system clipboard.
///
/// The clipboard is behind a trait so the controller-level flow (copy,
/// then report success or failure) can be tested without a display
/// server, and so headless environments can substitute a sink.
use crate::notify::{NoticeKind, Notifier};

pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()>;
}

/// The real OS clipboard. Construction can fail (no display server, no
/// clipboard provider); callers surface that the same way as a failed
/// write.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> anyhow::Result<Self> {
        let inner = arboard::Clipboard::new()?;
        Ok(Self { inner })
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.inner.set_text(text)?;
        Ok(())
    }
}

/// Copy the plan text to `sink` and report the outcome through the
/// notifier. The text goes over verbatim, empty included. Returns
/// whether the copy succeeded.
pub fn copy_plan(plan_text: &str, sink: &mut dyn ClipboardSink, notifier: &mut dyn Notifier) -> bool {
    match sink.set_text(plan_text) {
        Ok(()) => {
            notifier.notify(NoticeKind::Success, "Copied to clipboard!".to_string());
            true
        }
        Err(err) => {
            tracing::warn!(error = %err, "clipboard copy failed");
            notifier.notify(NoticeKind::Error, "Failed to copy".to_string());
            false
        }
    }
}
