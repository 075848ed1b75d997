//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /login                     - Login page
//! POST /login                     - Sign in (admin role only)
//! POST /logout                    - Sign out
//!
//! GET  /                          - Dashboard counts
//!
//! GET  /products                  - Products grouped by category
//! POST /products                  - Create (multipart, with image upload)
//! GET  /products/new              - Add product form
//! GET  /products/{id}/edit        - Edit product form
//! POST /products/{id}             - Update (multipart)
//! GET  /products/{id}/delete      - Confirm deletion
//! POST /products/{id}/delete      - Delete
//!
//! GET  /users                     - Customer accounts
//! GET  /users/{id}/delete         - Confirm deletion
//! POST /users/{id}/delete         - Delete
//!
//! GET  /orders                    - All orders, newest first
//! GET  /orders/{id}               - Order detail
//! POST /orders/{id}/status        - Change status
//! GET  /orders/{id}/delete        - Confirm deletion
//! POST /orders/{id}/delete        - Delete
//! ```

pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the console router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(products::router())
        .merge(users::router())
        .merge(orders::router())
}
