//! Cart route handlers.
//!
//! The cart page mounts the server cart; mutations go through
//! [`crate::services::cart`] and redirect back with a notice. The header badge
//! is an htmx fragment polled from `/cart/count`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use loomwear_core::ProductId;
use loomwear_core::cart::{Cart, CartError, CartLine, LineKey};
use loomwear_core::order::OrderSummary;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::notices;
use crate::services::cart::{self, CartSyncError};
use crate::state::AppState;
use crate::views::PageContext;

pub const LOGIN_TO_ADD_NOTICE: &str = "Please log in first to add products to your cart";

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data, posted from the product page.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    pub quantity: Option<i64>,
}

/// Identifies one cart line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub product_id: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
}

impl LineForm {
    fn key(&self) -> LineKey {
        LineKey::new(
            ProductId::new(self.product_id.clone()),
            self.size.clone(),
            self.color.clone(),
        )
    }
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    pub quantity: i64,
}

impl UpdateCartForm {
    fn key(&self) -> LineKey {
        LineKey::new(
            ProductId::new(self.product_id.clone()),
            self.size.clone(),
            self.color.clone(),
        )
    }
}

/// Positive quantities only; anything else is rejected before touching the cart.
fn positive_quantity(quantity: i64) -> std::result::Result<u32, CartError> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or(CartError::InvalidQuantity)
}

/// Pick the submitted option when the product offers it, else its first option.
fn choose_option(submitted: &str, offered: &[String]) -> String {
    let submitted = submitted.trim();
    if offered.iter().any(|o| o == submitted) || (offered.is_empty() && !submitted.is_empty()) {
        return submitted.to_string();
    }
    offered.first().cloned().unwrap_or_default()
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub cart: Cart,
    pub summary: OrderSummary,
}

/// Cart count badge fragment template (for htmx).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page, replacing the session cart with the server cart.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let cart = cart::mount(state.backend(), &session, user.as_ref()).await;
    let summary = OrderSummary::from_lines(cart.lines());

    CartTemplate {
        page: PageContext::build(&state, &session).await,
        cart,
        summary,
    }
}

/// Cart count badge, polled by the header.
#[instrument(skip(state, session, user))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let cart = match user {
        Some(user) => match cart::refresh(state.backend(), &session, &user).await {
            Ok(cart) => cart,
            Err(e) => {
                tracing::debug!(error = %e, "Cart badge refresh failed");
                cart::load(&session).await
            }
        },
        None => cart::load(&session).await,
    };

    CartCountTemplate {
        count: cart.item_count(),
    }
}

/// Turn a cart operation result into a redirect, surfacing rule violations as
/// notices.
async fn finish(
    session: &Session,
    result: std::result::Result<Cart, CartSyncError>,
    to: &str,
) -> Result<Response> {
    match result {
        Ok(_) => {}
        Err(CartSyncError::Cart(e)) => notices::error(session, e.to_string()).await,
        Err(CartSyncError::Session(e)) => return Err(AppError::Session(e)),
    }
    Ok(Redirect::to(to).into_response())
}

/// Add a product to the cart.
///
/// Guests are sent to the login page. Stock is checked against the freshly
/// fetched product before the optimistic update.
#[instrument(skip(state, session, user, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_path = format!("/product/{}", form.product_id);

    let Some(user) = user else {
        notices::error(&session, LOGIN_TO_ADD_NOTICE).await;
        return Ok(Redirect::to("/login").into_response());
    };

    let quantity = match positive_quantity(form.quantity.unwrap_or(1)) {
        Ok(q) => q,
        Err(e) => {
            notices::error(&session, e.to_string()).await;
            return Ok(Redirect::to(&product_path).into_response());
        }
    };

    let product = match state
        .backend()
        .get_product(&ProductId::new(form.product_id.clone()))
        .await
    {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!(error = %e, "Product lookup failed while adding to cart");
            notices::error(&session, e.user_message()).await;
            return Ok(Redirect::to(&product_path).into_response());
        }
    };

    let line = CartLine::from_product(
        &product,
        choose_option(&form.size, &product.sizes),
        choose_option(&form.color, &product.colors),
        quantity,
    );
    crate::error::add_breadcrumb("cart", "Add to cart", Some(&[("product_id", product.id.as_str())]));

    let result = cart::add(state.backend(), &session, &user, line).await;
    finish(&session, result, &product_path).await
}

/// Change a line's quantity.
#[instrument(skip(state, session, user, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let result = match positive_quantity(form.quantity) {
        Ok(quantity) => {
            cart::update(state.backend(), &session, &user, &form.key(), quantity).await
        }
        Err(e) => Err(e.into()),
    };
    finish(&session, result, "/cart").await
}

/// Remove a line.
#[instrument(skip(state, session, user, form))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<LineForm>,
) -> Result<Response> {
    let result = cart::remove(state.backend(), &session, &user, &form.key()).await;
    finish(&session, result, "/cart").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_quantity() {
        assert_eq!(positive_quantity(3), Ok(3));
        assert_eq!(positive_quantity(0), Err(CartError::InvalidQuantity));
        assert_eq!(positive_quantity(-2), Err(CartError::InvalidQuantity));
    }

    #[test]
    fn test_choose_option_falls_back_to_first_offered() {
        let sizes = vec!["S".to_string(), "M".to_string()];
        assert_eq!(choose_option("M", &sizes), "M");
        assert_eq!(choose_option("XXL", &sizes), "S");
        assert_eq!(choose_option("", &[]), "");
        assert_eq!(choose_option("Free", &[]), "Free");
    }
}
