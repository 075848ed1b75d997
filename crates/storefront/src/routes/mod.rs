//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /shop                   - All products (query, sort, page)
//! GET  /shop/{category}        - One category
//! GET  /search                 - Search by name
//! GET  /product/{id}           - Product detail
//! GET  /contact                - Contact page
//! POST /contact                - Contact form
//!
//! # Cart
//! GET  /cart                   - Cart page (mounts the server cart)
//! GET  /cart/count             - Cart count badge (htmx fragment)
//! POST /cart/add               - Add a line
//! POST /cart/update            - Change a line's quantity
//! POST /cart/remove            - Remove a line
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Checkout form
//! POST /checkout               - Place order
//! GET  /order-confirmation     - Order placed
//! GET  /order-failed           - Order failed
//!
//! # Auth
//! GET  /login, POST /login
//! GET  /register, POST /register
//! GET  /reset-password, POST /reset-password
//! POST /logout
//!
//! # Account (requires auth)
//! GET  /user-profile, POST /user-profile
//! GET  /order-history
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod products;
pub mod shop;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, cart_rate_limiter};
use crate::state::AppState;

/// Catalog browsing routes.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/shop", get(shop::index))
        .route("/shop/{category}", get(shop::category))
        .route("/search", get(shop::search))
        .route("/product/{id}", get(products::show))
        .route("/contact", get(contact::show).post(contact::submit))
}

/// Create the cart routes router. Mutations share one rate limiter.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .layer(cart_rate_limiter());

    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(mutations)
}

/// Create the auth routes router. Form submissions are rate limited.
pub fn auth_routes() -> Router<AppState> {
    let limiter = auth_rate_limiter();

    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(limiter.clone())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(post(auth::register).layer(limiter.clone())),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).merge(post(auth::reset_password).layer(limiter)),
        )
        .route("/logout", post(auth::logout))
}

/// Checkout and account routes.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/order-confirmation", get(checkout::confirmation))
        .route("/order-failed", get(checkout::failed))
        .route(
            "/user-profile",
            get(account::profile).post(account::update_profile),
        )
        .route("/order-history", get(account::order_history))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .merge(auth_routes())
        .merge(account_routes())
}
