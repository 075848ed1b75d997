//! Flash notices for console actions.
//!
//! Mutations redirect back to a listing; the notice rides along in the session
//! and is drained by [`crate::views::PageContext::build`].

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    /// CSS class for the notice banner.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.level {
            NoticeLevel::Success => "notice notice-success",
            NoticeLevel::Error => "notice notice-error",
        }
    }
}

/// Queue a notice. Session failures are logged and otherwise ignored.
pub async fn push(session: &Session, level: NoticeLevel, message: impl Into<String>) {
    let mut notices: Vec<Notice> = session
        .get(session_keys::NOTICES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    notices.push(Notice {
        level,
        message: message.into(),
    });
    if let Err(e) = session.insert(session_keys::NOTICES, notices).await {
        tracing::warn!(error = %e, "Failed to store notice in session");
    }
}

pub async fn success(session: &Session, message: impl Into<String>) {
    push(session, NoticeLevel::Success, message).await;
}

pub async fn error(session: &Session, message: impl Into<String>) {
    push(session, NoticeLevel::Error, message).await;
}

/// Remove and return every pending notice.
pub async fn take(session: &Session) -> Vec<Notice> {
    session
        .remove::<Vec<Notice>>(session_keys::NOTICES)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_notices_are_taken_once_in_order() {
        let session = session();
        success(&session, "Product deleted successfully!").await;
        error(&session, "Failed to delete order").await;

        let notices = take(&session).await;
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert_eq!(notices[1].message, "Failed to delete order");

        assert!(take(&session).await.is_empty());
    }

    #[test]
    fn test_css_class() {
        let notice = Notice {
            level: NoticeLevel::Error,
            message: String::new(),
        };
        assert_eq!(notice.css_class(), "notice notice-error");
    }
}
