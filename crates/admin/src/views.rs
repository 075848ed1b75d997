//! Shared console chrome: the sidebar and the notice banner.

use askama::Template;
use askama_web::WebTemplate;
use tower_sessions::Session;

use crate::filters;
use crate::models::CurrentAdmin;
use crate::notices::{self, Notice};

/// Sidebar and notice data common to all console pages.
#[derive(Debug, Clone)]
pub struct PageContext {
    /// `None` only on the login page.
    pub admin: Option<CurrentAdmin>,
    pub notices: Vec<Notice>,
    /// Sidebar entry to highlight.
    pub section: &'static str,
}

impl PageContext {
    /// Assemble the context, draining pending notices.
    pub async fn build(session: &Session, admin: Option<CurrentAdmin>, section: &'static str) -> Self {
        Self {
            admin,
            notices: notices::take(session).await,
            section,
        }
    }

    /// CSS class for a sidebar link.
    #[must_use]
    pub fn nav_class(&self, section: &str) -> &'static str {
        if self.section == section {
            "nav-link active"
        } else {
            "nav-link"
        }
    }
}

/// Confirmation step for destructive actions.
///
/// Rendered by `GET .../delete`; the form posts back to the same path.
#[derive(Template, WebTemplate)]
#[template(path = "confirm.html")]
pub struct ConfirmTemplate {
    pub page: PageContext,
    pub heading: String,
    pub message: String,
    pub action: String,
    pub cancel: String,
}
