use std::time::Duration;

use shared::StatusNotice;
use tokio::time::Instant;

pub const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub expires_at: Instant,
}

/// Holds at most one toast. Showing a new one replaces whatever is there.
#[derive(Debug, Default)]
pub struct ToastSlot {
    current: Option<Toast>,
}

impl ToastSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notice: StatusNotice) {
        self.current = Some(Toast {
            title: notice.title.to_string(),
            message: notice.message.to_string(),
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    /// The visible toast, if any. Expired toasts are cleared on read.
    pub fn current(&mut self) -> Option<Toast> {
        if self
            .current
            .as_ref()
            .is_some_and(|toast| Instant::now() >= toast.expires_at)
        {
            self.current = None;
        }
        self.current.clone()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
