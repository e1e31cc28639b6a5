//! Transient user-facing messages.
//!
//! At most one notice is up at a time: each new one immediately supersedes
//! whatever is displayed, then auto-dismisses after a fixed duration unless
//! the user dismisses it first. No queue. A generation counter keeps a
//! superseded notice's expiry from tearing down its successor.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Presentation class of a notice. Carries no other semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
    Warning,
}

/// One transient message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

/// Single-slot notice channel with auto-dismissal.
pub struct Notifier {
    current: watch::Sender<Option<Notice>>,
    generation: AtomicU64,
    dismiss_after: Duration,
}

impl Notifier {
    pub fn new(dismiss_after: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            generation: AtomicU64::new(0),
            dismiss_after,
        }
    }

    /// Observe the currently displayed notice (or `None`).
    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.current.subscribe()
    }

    pub fn current(&self) -> Option<Notice> {
        self.current.borrow().clone()
    }

    /// Show a notice, superseding any displayed one, and schedule its
    /// auto-dismissal.
    pub fn notify(self: &Arc<Self>, level: NoticeLevel, text: impl Into<String>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.current.send_replace(Some(Notice {
            level,
            text: text.into(),
            posted_at: Utc::now(),
        }));

        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(notifier.dismiss_after).await;
            // Only the notice that scheduled this expiry may clear the slot.
            if notifier.generation.load(Ordering::SeqCst) == generation {
                notifier.current.send_replace(None);
            }
        });
    }

    pub fn success(self: &Arc<Self>, text: impl Into<String>) {
        self.notify(NoticeLevel::Success, text);
    }

    pub fn error(self: &Arc<Self>, text: impl Into<String>) {
        self.notify(NoticeLevel::Error, text);
    }

    pub fn info(self: &Arc<Self>, text: impl Into<String>) {
        self.notify(NoticeLevel::Info, text);
    }

    pub fn warning(self: &Arc<Self>, text: impl Into<String>) {
        self.notify(NoticeLevel::Warning, text);
    }

    /// User dismissal: clear immediately.
    pub fn dismiss(&self) {
        self.current.send_replace(None);
    }
}
