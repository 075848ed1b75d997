//! Contact page route handlers.
//!
//! The form is acknowledged with a notice; messages are logged, not delivered.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use loomwear_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::notices;
use crate::state::AppState;
use crate::views::PageContext;

pub const CONTACT_THANKS_NOTICE: &str = "Thanks for reaching out! We will get back to you soon.";

/// Contact form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub page: PageContext,
}

/// Display the contact page.
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    ContactTemplate {
        page: PageContext::build(&state, &session).await,
    }
}

/// Acknowledge a contact form submission.
#[instrument(skip(session, form))]
pub async fn submit(session: Session, Form(form): Form<ContactForm>) -> impl IntoResponse {
    if form.name.trim().is_empty() || form.message.trim().is_empty() {
        notices::error(&session, "Please fill in your name and message.").await;
        return Redirect::to("/contact");
    }
    if let Err(e) = Email::parse(&form.email) {
        notices::error(&session, e.to_string()).await;
        return Redirect::to("/contact");
    }

    tracing::info!(message_len = form.message.len(), "Contact form received");
    notices::success(&session, CONTACT_THANKS_NOTICE).await;
    Redirect::to("/contact")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page(cart_count: u32) -> PageContext {
        PageContext {
            user: None,
            cart_count,
            notices: Vec::new(),
            cart_poll_secs: 5,
        }
    }

    #[test]
    fn test_header_badge_shows_cart_count() {
        let html = ContactTemplate { page: page(3) }.render().unwrap();
        assert!(html.contains(r#"<span class="badge">3</span>"#));
    }

    #[test]
    fn test_header_badge_hidden_for_empty_cart() {
        let html = ContactTemplate { page: page(0) }.render().unwrap();
        assert!(!html.contains(r#"class="badge""#));
    }
}
