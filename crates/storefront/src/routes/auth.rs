//! Authentication route handlers.
//!
//! Login, registration, password reset and logout against the backend's auth
//! endpoints. A successful login stores a [`CurrentUser`] and pulls the
//! shopper's server cart into the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use loomwear_core::validation::{LoginForm, RegisterForm, ResetPasswordForm};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::notices;
use crate::services::cart;
use crate::state::AppState;
use crate::views::PageContext;

pub const LOGGED_IN_NOTICE: &str = "You logged in successfully";
pub const LOGGED_OUT_NOTICE: &str = "Logged out successfully";
pub const REGISTERED_NOTICE: &str = "User registered successfully";
pub const PASSWORD_UPDATED_NOTICE: &str = "Password updated successfully";

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub page: PageContext,
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page. Signed-in shoppers go straight to their profile.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if user.is_some() {
        return Redirect::to("/user-profile").into_response();
    }
    LoginTemplate {
        page: PageContext::build(&state, &session).await,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(e) => {
            notices::error(&session, e.to_string()).await;
            return Ok(Redirect::to("/login").into_response());
        }
    };

    let login = match state.backend().login(&credentials).await {
        Ok(login) => login,
        Err(e) => {
            tracing::info!(error = %e, "Login rejected");
            notices::error(&session, e.user_message()).await;
            return Ok(Redirect::to("/login").into_response());
        }
    };

    // The greeting name is a nicety; a failed profile fetch does not block login.
    let first_name = match state.backend().get_user(&login.id).await {
        Ok(profile) => profile.first_name,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch profile after login");
            String::new()
        }
    };

    let user = CurrentUser {
        id: login.id,
        role: login.role,
        first_name,
    };
    set_current_user(&session, &user)
        .await
        .map_err(AppError::Session)?;
    set_sentry_user(&user.id);

    cart::mount(state.backend(), &session, Some(&user)).await;

    tracing::info!(user_id = %user.id, "User logged in");
    notices::success(&session, LOGGED_IN_NOTICE).await;
    Ok(Redirect::to("/user-profile").into_response())
}

/// Log out, dropping the user and the cart mirror from the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    notices::success(&session, LOGGED_OUT_NOTICE).await;
    Ok(Redirect::to("/login"))
}

// =============================================================================
// Registration
// =============================================================================

pub async fn register_page(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    RegisterTemplate {
        page: PageContext::build(&state, &session).await,
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Redirect {
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(e) => {
            notices::error(&session, e.to_string()).await;
            return Redirect::to("/register");
        }
    };

    match state.backend().register(&registration).await {
        Ok(()) => {
            notices::success(&session, REGISTERED_NOTICE).await;
            Redirect::to("/login")
        }
        Err(e) => {
            tracing::info!(error = %e, "Registration rejected");
            notices::error(&session, e.user_message()).await;
            Redirect::to("/register")
        }
    }
}

// =============================================================================
// Password Reset
// =============================================================================

pub async fn reset_password_page(
    State(state): State<AppState>,
    session: Session,
) -> impl IntoResponse {
    ResetPasswordTemplate {
        page: PageContext::build(&state, &session).await,
    }
}

/// Handle password reset form submission.
#[instrument(skip(state, session, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Redirect {
    let reset = match form.validate() {
        Ok(reset) => reset,
        Err(e) => {
            notices::error(&session, e.to_string()).await;
            return Redirect::to("/reset-password");
        }
    };

    match state.backend().reset_password(&reset).await {
        Ok(()) => {
            notices::success(&session, PASSWORD_UPDATED_NOTICE).await;
            Redirect::to("/login")
        }
        Err(e) => {
            tracing::info!(error = %e, "Password reset rejected");
            notices::error(&session, e.user_message()).await;
            Redirect::to("/reset-password")
        }
    }
}
