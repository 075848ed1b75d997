//! Customer account management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    response::Redirect,
    routing::get,
};
use loomwear_core::UserId;
use loomwear_core::user::User;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::notices;
use crate::state::AppState;
use crate::views::{ConfirmTemplate, PageContext};

pub const LOAD_FAILED_NOTICE: &str = "Failed to load users.";
pub const DELETED_NOTICE: &str = "User Deleted Successfully";
pub const DELETE_FAILED_NOTICE: &str = "Failed to delete user";
pub const SELF_DELETE_NOTICE: &str = "You cannot delete your own account";

#[derive(Template, WebTemplate)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub page: PageContext,
    pub users: Vec<User>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(index))
        .route("/users/{id}/delete", get(confirm_delete).post(delete))
}

/// GET /users
#[instrument(skip_all)]
async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> UsersTemplate {
    let users = match state.backend().list_users().await {
        Ok(users) => users,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load users");
            notices::error(&session, LOAD_FAILED_NOTICE).await;
            Vec::new()
        }
    };

    UsersTemplate {
        page: PageContext::build(&session, Some(admin), "users").await,
        users,
    }
}

/// GET /users/{id}/delete
async fn confirm_delete(
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> ConfirmTemplate {
    ConfirmTemplate {
        page: PageContext::build(&session, Some(admin), "users").await,
        heading: "Delete user".to_string(),
        message: "Are you sure you want to delete this user?".to_string(),
        action: format!("/users/{id}/delete"),
        cancel: "/users".to_string(),
    }
}

/// POST /users/{id}/delete
#[instrument(skip(state, session, admin))]
async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Redirect {
    if id == admin.id {
        notices::error(&session, SELF_DELETE_NOTICE).await;
        return Redirect::to("/users");
    }

    match state.backend().delete_user(&id).await {
        Ok(()) => {
            tracing::info!(user_id = %id, "User deleted");
            notices::success(&session, DELETED_NOTICE).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete user");
            notices::error(&session, DELETE_FAILED_NOTICE).await;
        }
    }
    Redirect::to("/users")
}
