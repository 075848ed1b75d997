//! Shop listing and search route handlers.
//!
//! Listings are filtered, sorted and paged in-process over the (cached) product
//! list; the backend offers no query parameters of its own.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use loomwear_core::catalog::{CatalogPage, CatalogQuery, Category, CategoryCounts, SortOrder};
use serde::{Deserialize, Deserializer};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::notices;
use crate::routes::home::PRODUCTS_LOAD_FAILED_NOTICE;
use crate::state::AppState;
use crate::views::PageContext;

/// Sort choices offered in the listing toolbar.
pub const SORT_OPTIONS: [(SortOrder, &str); 4] = [
    (SortOrder::Default, "Default"),
    (SortOrder::Popularity, "Popularity"),
    (SortOrder::PriceAsc, "Price: low to high"),
    (SortOrder::PriceDesc, "Price: high to low"),
];

/// Deserialize empty query values as `None`.
fn empty_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Listing query parameters shared by `/shop` and `/search`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    pub query: Option<String>,
    pub sort: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    pub page: Option<usize>,
}

impl ListingQuery {
    fn to_catalog_query(&self, category: Option<Category>) -> CatalogQuery {
        CatalogQuery {
            query: self.query.clone(),
            category,
            sort: self.sort.as_deref().map_or_else(SortOrder::default, SortOrder::parse),
            page: self.page.unwrap_or(1).max(1),
            ..CatalogQuery::default()
        }
    }
}

/// Shop listing template, also used for search results.
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub page: PageContext,
    pub title: String,
    /// Form action and "load more" base path.
    pub path: String,
    pub is_search: bool,
    pub query: String,
    pub sort: SortOrder,
    pub sort_options: [(SortOrder, &'static str); 4],
    pub category: Option<Category>,
    pub categories: [Category; 3],
    pub counts: CategoryCounts,
    pub results: CatalogPage,
    pub next_page: usize,
}

async fn render(
    state: &AppState,
    session: &Session,
    listing: &ListingQuery,
    category: Option<Category>,
    title: String,
    path: String,
    is_search: bool,
) -> ShopTemplate {
    let products = match state.backend().list_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load product list");
            notices::error(session, PRODUCTS_LOAD_FAILED_NOTICE).await;
            Vec::new()
        }
    };

    let query = listing.to_catalog_query(category);
    let counts = CategoryCounts::tally(&products);
    let results = query.apply(products);

    ShopTemplate {
        page: PageContext::build(state, session).await,
        title,
        path,
        is_search,
        query: query.query.clone().unwrap_or_default(),
        sort: query.sort,
        sort_options: SORT_OPTIONS,
        category,
        categories: Category::ALL,
        counts,
        results,
        next_page: query.page + 1,
    }
}

/// Display every product.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(listing): Query<ListingQuery>,
) -> impl IntoResponse {
    render(
        &state,
        &session,
        &listing,
        None,
        "Shop".to_string(),
        "/shop".to_string(),
        false,
    )
    .await
}

/// Display one category. Unknown categories are a 404.
#[instrument(skip(state, session))]
pub async fn category(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Query(listing): Query<ListingQuery>,
) -> Result<Response> {
    let category =
        Category::parse(&slug).ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    Ok(render(
        &state,
        &session,
        &listing,
        Some(category),
        category.display_name().to_string(),
        format!("/shop/{}", category.slug()),
        false,
    )
    .await
    .into_response())
}

/// Search products by name.
#[instrument(skip(state, session))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(listing): Query<ListingQuery>,
) -> impl IntoResponse {
    let title = match listing.query.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => format!("Results for \"{q}\""),
        _ => "Search".to_string(),
    };
    render(
        &state,
        &session,
        &listing,
        None,
        title,
        "/search".to_string(),
        true,
    )
    .await
}
