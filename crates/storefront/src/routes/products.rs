//! Product detail route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{Days, Local, NaiveDate};
use loomwear_core::ProductId;
use loomwear_core::catalog::Product;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::state::AppState;
use crate::views::PageContext;

/// Days between ordering and the estimated delivery.
const DELIVERY_DAYS: u64 = 5;

/// Number of other products suggested under the detail view.
const SIMILAR_COUNT: usize = 3;

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub page: PageContext,
    pub product: Product,
    pub similar: Vec<Product>,
    pub estimated_delivery: String,
}

/// Estimated delivery date for an order placed on `today`.
#[must_use]
pub fn estimated_delivery(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(DELIVERY_DAYS))
        .unwrap_or(today)
}

/// Display a product with its size, color and quantity pickers.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);
    let product = state.backend().get_product(&id).await?;

    // Suggestions are decoration; a failure just leaves the strip empty.
    let similar = state
        .backend()
        .list_products()
        .await
        .map(|products| {
            products
                .into_iter()
                .filter(|p| p.id != id)
                .take(SIMILAR_COUNT)
                .collect()
        })
        .unwrap_or_default();

    Ok(ProductTemplate {
        page: PageContext::build(&state, &session).await,
        product,
        similar,
        estimated_delivery: estimated_delivery(Local::now().date_naive())
            .format("%d/%m/%Y")
            .to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_delivery_is_five_days_out() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 29).unwrap();
        assert_eq!(
            estimated_delivery(today),
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()
        );
    }
}
