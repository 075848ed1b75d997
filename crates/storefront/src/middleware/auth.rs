//! Authentication extractors.
//!
//! The signed-in shopper lives in the session as a [`CurrentUser`]. Pages that
//! need a shopper take [`RequireAuth`]; pages that only adapt to one take
//! [`OptionalAuth`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};
use crate::notices;

/// Notice queued when a guest hits a protected page.
pub const LOGIN_REQUIRED_NOTICE: &str = "Please login to view this page";

/// Extractor that requires a signed-in shopper.
///
/// Guests are sent to `/login` with a notice explaining why.
///
/// # Example
///
/// ```rust,ignore
/// async fn checkout(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Checking out as {}", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is signed in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for page requests).
    RedirectToLogin,
    /// Unauthorized response (htmx fragments and requests without a session).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        if let Some(user) = current_user(session).await {
            return Ok(Self(user));
        }

        if parts.headers.contains_key("hx-request") {
            return Err(AuthRejection::Unauthorized);
        }

        notices::error(session, LOGIN_REQUIRED_NOTICE).await;
        Err(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that optionally gets the signed-in shopper.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Read the signed-in shopper from the session, if any.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Helper to set the current user in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user and their cart mirror (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session
        .remove::<loomwear_core::cart::Cart>(session_keys::CART)
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

    fn parts_with(session: &Session, htmx: bool) -> Parts {
        let mut builder = Request::builder().uri("/checkout");
        if htmx {
            builder = builder.header("hx-request", "true");
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        parts.extensions.insert(session.clone());
        parts
    }

    fn shopper() -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            role: UserRole::Customer,
            first_name: "Asha".to_string(),
        }
    }

    #[tokio::test]
    async fn test_require_auth_redirects_guest_with_notice() {
        let session = session();
        let mut parts = parts_with(&session, false);

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::RedirectToLogin)));

        let queued = notices::take(&session).await;
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].message, LOGIN_REQUIRED_NOTICE);
    }

    #[tokio::test]
    async fn test_require_auth_rejects_htmx_without_redirect() {
        let session = session();
        let mut parts = parts_with(&session, true);

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Unauthorized)));
        assert!(notices::take(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_require_auth_accepts_signed_in_user() {
        let session = session();
        set_current_user(&session, &shopper()).await.unwrap();
        let mut parts = parts_with(&session, false);

        let RequireAuth(user) = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.id, UserId::new("u1"));
    }

    #[tokio::test]
    async fn test_clear_current_user() {
        let session = session();
        set_current_user(&session, &shopper()).await.unwrap();
        clear_current_user(&session).await.unwrap();

        let mut parts = parts_with(&session, false);
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());
    }
}
