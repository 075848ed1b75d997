//! Authentication route handlers for admin.
//!
//! Admins sign in with their backend account. The backend decides the role;
//! accounts without the `admin` role never get a console session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use loomwear_core::validation::LoginForm;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::notices;
use crate::state::AppState;
use crate::views::PageContext;

pub const NOT_ADMIN_NOTICE: &str = "Access denied. An administrator account is required.";
pub const LOGGED_IN_NOTICE: &str = "Logged in successfully";
pub const LOGGED_OUT_NOTICE: &str = "Logged out successfully";

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

/// GET /login
async fn login_page(session: Session, OptionalAdmin(admin): OptionalAdmin) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        page: PageContext::build(&session, None, "login").await,
    }
    .into_response()
}

/// POST /login
#[instrument(skip(state, session, form))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(e) => {
            notices::error(&session, e.to_string()).await;
            return Ok(Redirect::to("/login"));
        }
    };

    let login = match state.backend().login(&credentials).await {
        Ok(login) => login,
        Err(e) => {
            tracing::info!(error = %e, "Admin login rejected by backend");
            notices::error(&session, e.user_message()).await;
            return Ok(Redirect::to("/login"));
        }
    };

    if !login.role.is_admin() {
        tracing::warn!(user_id = %login.id, "Non-admin attempted console login");
        notices::error(&session, NOT_ADMIN_NOTICE).await;
        return Ok(Redirect::to("/login"));
    }

    let name = match state.backend().get_user(&login.id).await {
        Ok(user) if !user.full_name().is_empty() => user.full_name(),
        Ok(user) => user.email,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch admin profile");
            credentials.email.to_string()
        }
    };

    let admin = CurrentAdmin {
        id: login.id,
        role: login.role,
        name,
    };
    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.id);

    tracing::info!(user_id = %admin.id, "Admin logged in");
    notices::success(&session, LOGGED_IN_NOTICE).await;
    Ok(Redirect::to("/"))
}

/// POST /logout
#[instrument(skip(session))]
async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    notices::success(&session, LOGGED_OUT_NOTICE).await;
    Ok(Redirect::to("/login"))
}
