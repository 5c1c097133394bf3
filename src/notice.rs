//! Transient status messages shown on the form.

use std::fmt;
use std::time::{Duration, Instant};

/// How long a notice stays visible unless configured otherwise.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    posted_at: Instant,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NoticeKind::Success => write!(f, "[ok] {}", self.message),
            NoticeKind::Error => write!(f, "[error] {}", self.message),
        }
    }
}

/// Holds at most one notice. Posting replaces whatever was there.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    current: Option<Notice>,
    ttl: Duration,
    posted: u64,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: None,
            ttl,
            posted: 0,
        }
    }

    /// Number of notices posted over the board's lifetime.
    pub fn posted(&self) -> u64 {
        self.posted
    }

    pub fn post(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.post_at(kind, message, Instant::now());
    }

    pub fn post_at(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) {
        self.current = Some(Notice {
            kind,
            message: message.into(),
            posted_at: now,
        });
        self.posted += 1;
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.post(NoticeKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.post(NoticeKind::Error, message);
    }

    pub fn visible(&self) -> Option<&Notice> {
        self.visible_at(Instant::now())
    }

    /// The current notice, if it has not yet outlived the TTL at `now`.
    pub fn visible_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.posted_at) < self.ttl)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}
