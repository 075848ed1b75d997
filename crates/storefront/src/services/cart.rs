//! Cart reconciliation between the session mirror and the backend cart.
//!
//! The backend owns the persisted cart; the session holds a mirror so pages
//! render without a round trip. Pages that own cart state *mount* it, which
//! replaces the mirror with the server copy. Mutations are optimistic: the
//! mirror changes and is saved first, then the backend call is made. A failed
//! call surfaces a notice and the local change stays.

use loomwear_backend::{BackendClient, BackendError};
use loomwear_core::cart::{Cart, CartError, CartLine, LineKey};
use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use crate::models::{CurrentUser, session_keys};
use crate::notices;

pub const LOAD_FAILED_NOTICE: &str = "Failed to load cart data.";
pub const ADDED_NOTICE: &str = "Product added to the cart";
pub const REMOVED_NOTICE: &str = "Product removed from the cart.";
pub const UPDATED_NOTICE: &str = "Quantity updated.";

/// Errors from a cart operation that stop it before any mutation.
#[derive(Debug, Error)]
pub enum CartSyncError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Read the session cart. A missing or unreadable entry is an empty cart.
pub async fn load(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persist the session cart.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Replace the session cart with the server cart.
///
/// Guests keep whatever the session holds. On a backend failure the local cart
/// is kept and a notice is queued.
#[instrument(skip(backend, session, user), fields(user_id = user.map(|u| u.id.as_str())))]
pub async fn mount(backend: &BackendClient, session: &Session, user: Option<&CurrentUser>) -> Cart {
    let Some(user) = user else {
        return load(session).await;
    };

    match refresh(backend, session, user).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load server cart");
            notices::error(session, LOAD_FAILED_NOTICE).await;
            load(session).await
        }
    }
}

/// Fetch the server cart into the session without queuing notices.
///
/// Used by the header badge poll, which would otherwise stack a notice per
/// poll while the backend is down.
///
/// # Errors
///
/// Returns the backend error; the session cart is left untouched.
pub async fn refresh(
    backend: &BackendClient,
    session: &Session,
    user: &CurrentUser,
) -> Result<Cart, BackendError> {
    let lines = backend.get_cart(&user.id).await?;
    let mut cart = load(session).await;
    cart.replace(lines);
    if let Err(e) = save(session, &cart).await {
        tracing::warn!(error = %e, "Failed to store refreshed cart");
    }
    Ok(cart)
}

/// Add a line for a signed-in shopper.
///
/// # Errors
///
/// Returns [`CartError::InvalidQuantity`] or [`CartError::InsufficientStock`]
/// before touching the cart, or a session error if the mirror cannot be saved.
#[instrument(skip(backend, session, user, line), fields(user_id = %user.id, product_id = %line.product_id))]
pub async fn add(
    backend: &BackendClient,
    session: &Session,
    user: &CurrentUser,
    line: CartLine,
) -> Result<Cart, CartSyncError> {
    let mut cart = load(session).await;
    if line.quantity == 0 {
        return Err(CartError::InvalidQuantity.into());
    }
    cart.check_stock(&line)?;

    let request_line = line.clone();
    cart.add(line)?;
    save(session, &cart).await?;

    match backend.add_to_cart(&user.id, &request_line).await {
        Ok(()) => notices::success(session, ADDED_NOTICE).await,
        Err(e) => {
            tracing::warn!(error = %e, "Add to cart failed on the backend");
            notices::error(session, e.user_message()).await;
        }
    }
    Ok(cart)
}

/// Remove a line. The backend removes by product id only.
///
/// # Errors
///
/// Returns a session error if the mirror cannot be saved.
#[instrument(skip(backend, session, user), fields(user_id = %user.id))]
pub async fn remove(
    backend: &BackendClient,
    session: &Session,
    user: &CurrentUser,
    key: &LineKey,
) -> Result<Cart, CartSyncError> {
    let mut cart = load(session).await;
    cart.remove(key);
    save(session, &cart).await?;

    match backend.remove_cart_item(&user.id, &key.product_id).await {
        Ok(()) => notices::success(session, REMOVED_NOTICE).await,
        Err(e) => {
            tracing::warn!(error = %e, "Remove from cart failed on the backend");
            notices::error(session, e.user_message()).await;
        }
    }
    Ok(cart)
}

/// Set a line's quantity.
///
/// # Errors
///
/// Zero quantities, unknown lines and quantities above the line's stock are
/// rejected before any mutation.
#[instrument(skip(backend, session, user), fields(user_id = %user.id))]
pub async fn update(
    backend: &BackendClient,
    session: &Session,
    user: &CurrentUser,
    key: &LineKey,
    quantity: u32,
) -> Result<Cart, CartSyncError> {
    if quantity == 0 {
        return Err(CartError::InvalidQuantity.into());
    }
    let mut cart = load(session).await;
    let stock = cart.get(key).ok_or(CartError::LineNotFound)?.stock;
    if quantity > stock {
        return Err(CartError::InsufficientStock {
            requested: quantity,
            available: stock,
        }
        .into());
    }

    cart.set_quantity(key, quantity)?;
    save(session, &cart).await?;

    match backend
        .update_cart_item(&user.id, &key.product_id, quantity)
        .await
    {
        Ok(()) => notices::success(session, UPDATED_NOTICE).await,
        Err(e) => {
            tracing::warn!(error = %e, "Cart quantity update failed on the backend");
            notices::error(session, e.user_message()).await;
        }
    }
    Ok(cart)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use loomwear_backend::BackendConfig;
    use loomwear_core::{ProductId, UserId, UserRole};
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::notices::NoticeLevel;

    /// A client whose every call fails at the transport level.
    fn unreachable_backend() -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            cache_ttl: None,
        })
        .unwrap()
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn shopper() -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            role: UserRole::Customer,
            first_name: "Asha".to_string(),
        }
    }

    fn line(id: &str, quantity: u32, stock: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: format!("Hoodie {id}"),
            image: None,
            price: Decimal::from(999),
            stock,
            size: "M".to_string(),
            color: "Black".to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_failed_add_keeps_local_line_and_queues_notice() {
        let backend = unreachable_backend();
        let session = session();

        let cart = add(&backend, &session, &shopper(), line("p1", 2, 10))
            .await
            .unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(load(&session).await, cart);

        let queued = notices::take(&session).await;
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_add_beyond_stock_is_rejected_without_mutation() {
        let backend = unreachable_backend();
        let session = session();
        save(&session, &Cart::from_lines(vec![line("p1", 3, 4)]))
            .await
            .unwrap();

        let err = add(&backend, &session, &shopper(), line("p1", 2, 4))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartSyncError::Cart(CartError::InsufficientStock {
                requested: 5,
                available: 4
            })
        ));
        assert_eq!(load(&session).await.item_count(), 3);
    }

    #[tokio::test]
    async fn test_update_rejects_zero_before_mutation() {
        let backend = unreachable_backend();
        let session = session();
        let existing = line("p1", 1, 5);
        save(&session, &Cart::from_lines(vec![existing.clone()]))
            .await
            .unwrap();

        let err = update(&backend, &session, &shopper(), &existing.key(), 0)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Quantity must be greater than 0.");
        assert_eq!(load(&session).await.item_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_local_removal() {
        let backend = unreachable_backend();
        let session = session();
        let existing = line("p1", 1, 5);
        save(&session, &Cart::from_lines(vec![existing.clone()]))
            .await
            .unwrap();

        let cart = remove(&backend, &session, &shopper(), &existing.key())
            .await
            .unwrap();
        assert!(cart.is_empty());
        assert!(!notices::take(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_mount_failure_keeps_local_cart() {
        let backend = unreachable_backend();
        let session = session();
        save(&session, &Cart::from_lines(vec![line("p1", 1, 5)]))
            .await
            .unwrap();

        let user = shopper();
        let cart = mount(&backend, &session, Some(&user)).await;
        assert_eq!(cart.item_count(), 1);

        let queued = notices::take(&session).await;
        assert_eq!(queued[0].message, LOAD_FAILED_NOTICE);
    }

    #[tokio::test]
    async fn test_mount_for_guest_skips_backend() {
        let backend = unreachable_backend();
        let session = session();

        let cart = mount(&backend, &session, None).await;
        assert!(cart.is_empty());
        assert!(notices::take(&session).await.is_empty());
    }
}
