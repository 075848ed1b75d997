//! Account route handlers (require authentication).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use loomwear_backend::BackendError;
use loomwear_core::order::Order;
use loomwear_core::user::User;
use loomwear_core::validation::ProfileForm;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAuth, clear_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::notices;
use crate::state::AppState;
use crate::views::PageContext;

pub const PROFILE_UPDATED_NOTICE: &str = "User updated successfully";
pub const PROFILE_UPDATE_FAILED_NOTICE: &str = "User update failed";
pub const PROFILE_LOAD_FAILED_NOTICE: &str = "Error fetching user data";
pub const ORDERS_LOAD_FAILED_NOTICE: &str = "Failed to load your orders.";

#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub user: User,
    /// Link to the admin console, present only for administrators.
    pub admin_url: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrderHistoryTemplate {
    pub page: PageContext,
    pub orders: Vec<Order>,
}

/// Display the profile form.
///
/// An account the backend no longer knows ends the session. Any other fetch
/// failure renders the form from the session user with an error notice.
#[instrument(skip(state, session, current))]
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let user = match state.backend().get_user(&current.id).await {
        Ok(user) => user,
        Err(BackendError::NotFound(_)) => {
            tracing::warn!(user_id = %current.id, "Signed-in account no longer exists");
            clear_current_user(&session)
                .await
                .map_err(AppError::Session)?;
            notices::error(&session, PROFILE_LOAD_FAILED_NOTICE).await;
            return Ok(Redirect::to("/login").into_response());
        }
        Err(e) => {
            tracing::warn!(error = %e, user_id = %current.id, "Failed to fetch profile");
            notices::error(&session, PROFILE_LOAD_FAILED_NOTICE).await;
            session_profile(&current)
        }
    };

    let admin_url = current
        .is_admin()
        .then(|| state.config().admin_console_url.clone());

    Ok(ProfileTemplate {
        page: PageContext::build(&state, &session).await,
        user,
        admin_url,
    }
    .into_response())
}

/// What the session knows about the shopper, for when the backend is down.
fn session_profile(current: &CurrentUser) -> User {
    User {
        id: current.id.clone(),
        first_name: current.first_name.clone(),
        last_name: String::new(),
        email: String::new(),
        role: current.role,
        created_at: None,
    }
}

/// Save profile changes.
#[instrument(skip(state, session, current, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect> {
    let update = match form.validate() {
        Ok(update) => update,
        Err(e) => {
            notices::error(&session, e.to_string()).await;
            return Ok(Redirect::to("/user-profile"));
        }
    };

    match state.backend().update_user(&current.id, &update).await {
        Ok(()) => {
            // Keep the header greeting in step with the new name.
            let refreshed = CurrentUser {
                first_name: update.first_name.clone(),
                ..current
            };
            session
                .insert(session_keys::CURRENT_USER, &refreshed)
                .await
                .map_err(AppError::Session)?;
            notices::success(&session, PROFILE_UPDATED_NOTICE).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Profile update failed");
            notices::error(&session, PROFILE_UPDATE_FAILED_NOTICE).await;
        }
    }
    Ok(Redirect::to("/user-profile"))
}

/// List the shopper's orders.
#[instrument(skip(state, session, current))]
pub async fn order_history(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> impl IntoResponse {
    let orders = match state.backend().orders_for_user(&current.id).await {
        Ok(orders) => orders,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load order history");
            notices::error(&session, ORDERS_LOAD_FAILED_NOTICE).await;
            Vec::new()
        }
    };

    OrderHistoryTemplate {
        page: PageContext::build(&state, &session).await,
        orders,
    }
}
