use std::time::{Duration, Instant};

// How long a notice stays on screen before the tick sweeps it away.
const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

// A transient message shown at the bottom of the board. Raised by action
// outcomes and by local validation failures; dismissed automatically.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    raised_at: Instant,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
            raised_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
            raised_at: Instant::now(),
        }
    }

    pub fn expired(&self) -> bool {
        self.raised_at.elapsed() >= NOTICE_TTL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_notice_is_not_expired() {
        assert!(!Notice::success("Task created successfully!").expired());
        assert!(!Notice::error("Failed to load tasks").expired());
    }

    #[test]
    fn notice_expires_after_its_ttl() {
        let mut notice = Notice::success("old news");
        notice.raised_at = Instant::now() - NOTICE_TTL;
        assert!(notice.expired());
    }
}
