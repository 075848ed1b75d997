//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use loomwear_core::catalog::{CatalogQuery, Category, Product};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::notices;
use crate::state::AppState;
use crate::views::PageContext;

/// Number of products in the home page collection strip.
const FEATURED_COUNT: usize = 6;

pub const PRODUCTS_LOAD_FAILED_NOTICE: &str = "Failed to load products.";

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub categories: [Category; 3],
    pub featured: Vec<Product>,
}

/// Display the home page: category tiles and the first products of the catalog.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let featured = match state.backend().list_products().await {
        Ok(products) => {
            CatalogQuery {
                per_page: FEATURED_COUNT,
                ..CatalogQuery::default()
            }
            .apply(products)
            .products
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load featured products");
            notices::error(&session, PRODUCTS_LOAD_FAILED_NOTICE).await;
            Vec::new()
        }
    };

    HomeTemplate {
        page: PageContext::build(&state, &session).await,
        categories: Category::ALL,
        featured,
    }
}
