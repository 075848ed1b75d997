//! Authentication extractors for admin.
//!
//! Only backend accounts with the `admin` role may hold an admin session.
//! Every console page takes [`RequireAdmin`], which re-checks the role on each
//! request rather than trusting that a session exists.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};
use crate::notices;

/// Notice queued when someone without an admin session opens a console page.
pub const ADMIN_REQUIRED_NOTICE: &str = "Please login as an administrator";

/// Extractor that requires an administrator.
///
/// Without a session the request is rejected outright. Without an admin in the
/// session the visitor is redirected to `/login` with a notice.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

/// Error returned when a console page is requested without admin rights.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// No session layer in front of the handler.
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        match current_admin(session).await {
            Some(admin) if admin.is_admin() => Ok(Self(admin)),
            Some(admin) => {
                tracing::warn!(user_id = %admin.id, "Non-admin session rejected");
                if let Err(e) = clear_current_admin(session).await {
                    tracing::warn!(error = %e, "Failed to clear rejected session");
                }
                notices::error(session, ADMIN_REQUIRED_NOTICE).await;
                Err(AdminAuthRejection::RedirectToLogin)
            }
            None => {
                notices::error(session, ADMIN_REQUIRED_NOTICE).await;
                Err(AdminAuthRejection::RedirectToLogin)
            }
        }
    }
}

/// Extractor that optionally gets the current admin.
pub struct OptionalAdmin(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => current_admin(session).await.filter(CurrentAdmin::is_admin),
            None => None,
        };

        Ok(Self(admin))
    }
}

async fn current_admin(session: &Session) -> Option<CurrentAdmin> {
    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use loomwear_core::{UserId, UserRole};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn parts_with(session: &Session) -> Parts {
        let (mut parts, ()) = Request::builder()
            .uri("/orders")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(session.clone());
        parts
    }

    fn account(role: UserRole) -> CurrentAdmin {
        CurrentAdmin {
            id: UserId::new("a1"),
            role,
            name: "Meera".to_string(),
        }
    }

    #[tokio::test]
    async fn test_require_admin_redirects_anonymous() {
        let session = session();
        let mut parts = parts_with(&session);

        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AdminAuthRejection::RedirectToLogin)));
        assert_eq!(notices::take(&session).await[0].message, ADMIN_REQUIRED_NOTICE);
    }

    #[tokio::test]
    async fn test_require_admin_rejects_customer_role() {
        let session = session();
        set_current_admin(&session, &account(UserRole::Customer))
            .await
            .unwrap();
        let mut parts = parts_with(&session);

        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AdminAuthRejection::RedirectToLogin)));
        assert!(current_admin(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_require_admin_accepts_admin() {
        let session = session();
        set_current_admin(&session, &account(UserRole::Admin))
            .await
            .unwrap();
        let mut parts = parts_with(&session);

        let RequireAdmin(admin) = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(admin.name, "Meera");
    }

    #[tokio::test]
    async fn test_require_admin_without_session_layer() {
        let (mut parts, ()) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AdminAuthRejection::Unauthorized)));
    }
}
