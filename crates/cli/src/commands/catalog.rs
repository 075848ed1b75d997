//! Catalog inspection.
//!
//! ```bash
//! loomwear-cli catalog list
//! loomwear-cli catalog list --category oversize-tshirt
//! ```

use loomwear_backend::BackendError;
use loomwear_core::catalog::{Category, Product};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown category: {0}. Valid categories: hoodies, tshirt, oversize-tshirt")]
    UnknownCategory(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Print every product, optionally restricted to one category.
///
/// # Errors
///
/// Returns an error if the category is unknown or the backend call fails.
pub async fn list(category: Option<&str>) -> Result<(), CatalogError> {
    let category = category
        .map(|c| Category::parse(c).ok_or_else(|| CatalogError::UnknownCategory(c.to_owned())))
        .transpose()?;

    let products = super::backend_client()?.list_products().await?;
    let rows: Vec<String> = products
        .iter()
        .filter(|p| category.is_none_or(|c| p.category_kind() == Some(c)))
        .map(product_row)
        .collect();

    #[allow(clippy::print_stdout)]
    {
        for row in &rows {
            println!("{row}");
        }
    }
    tracing::info!("{} product(s)", rows.len());
    Ok(())
}

/// One tab-separated line: id, category, name, price, stock.
fn product_row(product: &Product) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        product.id,
        product.category,
        product.name,
        product.display_price(),
        if product.in_stock() {
            product.stock.to_string()
        } else {
            "out of stock".to_owned()
        }
    )
}
