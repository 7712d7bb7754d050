/// User-facing notifications. The core never renders anything — outcomes
/// are reported through the `Notifier` seam and the front end (TUI toasts,
/// headless stderr) decides how to show them.
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

pub trait Notifier {
    fn notify(&mut self, kind: NoticeKind, message: String);
}

// ── TUI toast queue ───────────────────────────────────────────────────────────

/// How long a toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(2);

/// Most recent notices kept; older ones fall off even if unexpired.
const TOAST_CAP: usize = 4;

struct Toast {
    notice: Notice,
    raised_at: Instant,
}

/// Bounded queue of short-lived notices for the TUI status area.
#[derive(Default)]
pub struct Toasts {
    queue: VecDeque<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired toasts. Called from the animation tick.
    pub fn prune(&mut self) {
        let now = Instant::now();
        self.queue
            .retain(|t| now.duration_since(t.raised_at) < TOAST_DURATION);
    }

    /// The notice to display right now: the newest unexpired one.
    pub fn current(&self) -> Option<&Notice> {
        let now = Instant::now();
        self.queue
            .iter()
            .rev()
            .find(|t| now.duration_since(t.raised_at) < TOAST_DURATION)
            .map(|t| &t.notice)
    }
}

impl Notifier for Toasts {
    fn notify(&mut self, kind: NoticeKind, message: String) {
        if self.queue.len() == TOAST_CAP {
            self.queue.pop_front();
        }
        self.queue.push_back(Toast {
            notice: Notice { kind, message },
            raised_at: Instant::now(),
        });
    }
}
