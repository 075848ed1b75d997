//! Shared page chrome.
//!
//! Every full page renders the header (greeting, cart badge) and the notice
//! banner from a [`PageContext`]. Build it last in a handler so notices queued
//! while handling the request are shown on this very page.

use tower_sessions::Session;

use crate::middleware::current_user;
use crate::models::CurrentUser;
use crate::notices::{self, Notice};
use crate::services::cart;
use crate::state::AppState;

/// Header and notice data common to all pages.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    pub notices: Vec<Notice>,
    /// Seconds between cart badge refreshes.
    pub cart_poll_secs: u64,
}

impl PageContext {
    /// Assemble the context from the session, draining pending notices.
    pub async fn build(state: &AppState, session: &Session) -> Self {
        let user = current_user(session).await;
        let cart_count = cart::load(session).await.item_count();
        let notices = notices::take(session).await;

        Self {
            user,
            cart_count,
            notices,
            cart_poll_secs: state.config().cart_poll_interval.as_secs(),
        }
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}
