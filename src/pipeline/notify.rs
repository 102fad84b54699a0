//! Transient user notifications (toasts).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(4);

/// Oldest toasts are dropped beyond this many.
pub const MAX_VISIBLE_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
    pub raised_at: Instant,
}

#[derive(Debug, Clone)]
pub struct Toasts {
    items: VecDeque<Toast>,
    ttl: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub fn push(&mut self, kind: ToastKind, title: &str, description: &str) {
        self.push_at(kind, title, description, Instant::now());
    }

    pub fn push_at(&mut self, kind: ToastKind, title: &str, description: &str, now: Instant) {
        self.items.push_back(Toast {
            kind,
            title: title.to_string(),
            description: description.to_string(),
            raised_at: now,
        });
        while self.items.len() > MAX_VISIBLE_TOASTS {
            self.items.pop_front();
        }
    }

    pub fn success(&mut self, title: &str, description: &str) {
        self.push(ToastKind::Success, title, description);
    }

    pub fn error(&mut self, title: &str, description: &str) {
        self.push(ToastKind::Error, title, description);
    }

    /// Drop toasts older than the TTL.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|t| now.saturating_duration_since(t.raised_at) < ttl);
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expire_after_ttl() {
        let mut toasts = Toasts::new(Duration::from_secs(4));
        let start = Instant::now();
        toasts.push_at(ToastKind::Success, "Stage updated", "", start);
        toasts.push_at(ToastKind::Error, "Error", "", start + Duration::from_secs(3));

        toasts.expire(start + Duration::from_secs(2));
        assert_eq!(toasts.len(), 2);

        toasts.expire(start + Duration::from_secs(5));
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.latest().map(|t| t.kind), Some(ToastKind::Error));

        toasts.expire(start + Duration::from_secs(10));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_oldest_dropped_beyond_limit() {
        let mut toasts = Toasts::default();
        for i in 0..(MAX_VISIBLE_TOASTS + 2) {
            toasts.success(&format!("t{i}"), "");
        }
        assert_eq!(toasts.len(), MAX_VISIBLE_TOASTS);
        assert_eq!(toasts.visible().next().map(|t| t.title.as_str()), Some("t2"));
    }
}
