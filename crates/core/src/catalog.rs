//! Product catalog types and listing rules.
//!
//! The backend only offers "list every product", so filtering, sorting and
//! pagination happen here, over the full list.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::price::decimal_number;
use crate::types::{ProductId, format_amount};

/// Product categories the store merchandises.
///
/// The backend stores the category as a string; products with any other value
/// still list under "all products" but never under a category page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Hoodies,
    Tshirt,
    OversizeTshirt,
}

impl Category {
    /// All merchandised categories, in display order.
    pub const ALL: [Self; 3] = [Self::Hoodies, Self::Tshirt, Self::OversizeTshirt];

    /// Value stored by the backend (`"Oversize-Tshirt"`).
    #[must_use]
    pub const fn as_backend_str(self) -> &'static str {
        match self {
            Self::Hoodies => "Hoodies",
            Self::Tshirt => "Tshirt",
            Self::OversizeTshirt => "Oversize-Tshirt",
        }
    }

    /// URL slug (`"oversize-tshirt"`).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Hoodies => "hoodies",
            Self::Tshirt => "tshirt",
            Self::OversizeTshirt => "oversize-tshirt",
        }
    }

    /// Human-readable heading (`"Oversize T-Shirts"`).
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Hoodies => "Hoodies",
            Self::Tshirt => "T-Shirts",
            Self::OversizeTshirt => "Oversize T-Shirts",
        }
    }

    /// Parse either a URL slug or the backend value, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| {
            c.slug().eq_ignore_ascii_case(s) || c.as_backend_str().eq_ignore_ascii_case(s)
        })
    }
}

/// A catalog product as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub gender: String,
    #[serde(with = "decimal_number")]
    pub price: Decimal,
    #[serde(default)]
    pub stock: u32,
    /// Available sizes.
    #[serde(default, rename = "size")]
    pub sizes: Vec<String>,
    /// Available colors.
    #[serde(default, rename = "color")]
    pub colors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub popularity: Option<i64>,
    #[serde(default)]
    pub details: Option<ProductDetails>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Free-text garment details shown on the product page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDetails {
    pub material: Option<String>,
    pub care_instructions: Option<String>,
    pub origin: Option<String>,
    pub fabric: Option<String>,
    pub neck: Option<String>,
    pub sleeve: Option<String>,
    pub style_code: Option<String>,
    pub occasion: Option<String>,
    pub suitable_for: Option<String>,
    pub shipping_info: Option<String>,
}

impl ProductDetails {
    /// Labelled rows that have a value, in display order.
    #[must_use]
    pub fn rows(&self) -> Vec<(&'static str, &str)> {
        [
            ("Material", &self.material),
            ("Care Instructions", &self.care_instructions),
            ("Origin", &self.origin),
            ("Fabric", &self.fabric),
            ("Neck", &self.neck),
            ("Sleeve", &self.sleeve),
            ("Style Code", &self.style_code),
            ("Occasion", &self.occasion),
            ("Suitable For", &self.suitable_for),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }
}

impl Product {
    /// First image, used for thumbnails and cart lines.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether any stock remains.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Price formatted for display.
    #[must_use]
    pub fn display_price(&self) -> String {
        format_amount(self.price)
    }

    /// Parsed category, if it is one the store merchandises.
    #[must_use]
    pub fn category_kind(&self) -> Option<Category> {
        Category::parse(&self.category)
    }
}

/// Product fields an administrator submits when creating or editing a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    pub gender: String,
    #[serde(with = "decimal_number")]
    pub price: Decimal,
    pub stock: u32,
    #[serde(rename = "size")]
    pub sizes: Vec<String>,
    #[serde(rename = "color")]
    pub colors: Vec<String>,
    pub images: Vec<String>,
}

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Keep the backend's order.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    Popularity,
}

impl SortOrder {
    /// Parse the `sort` query parameter. Unknown values keep the backend order.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            "popularity" => Self::Popularity,
            _ => Self::Default,
        }
    }

    /// Query-string form of this sort order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Popularity => "popularity",
        }
    }
}

/// Filtering, sorting and paging options for a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive substring matched against product names.
    pub query: Option<String>,
    pub category: Option<Category>,
    pub sort: SortOrder,
    /// 1-based page; listings grow cumulatively ("load more").
    pub page: usize,
    pub per_page: usize,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            sort: SortOrder::Default,
            page: 1,
            per_page: 9,
        }
    }
}

/// Result of applying a [`CatalogQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    /// Products shown, in order.
    pub products: Vec<Product>,
    /// Number of products matching the filters.
    pub total: usize,
    /// Number of products shown (`products.len()`).
    pub showing: usize,
    /// Whether another "load more" page exists.
    pub has_more: bool,
}

impl CatalogQuery {
    /// Filter, sort and page a product list.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> CatalogPage {
        let needle = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let mut matched: Vec<Product> = products
            .into_iter()
            .filter(|p| {
                needle
                    .as_ref()
                    .is_none_or(|n| p.name.to_lowercase().contains(n.as_str()))
            })
            .filter(|p| {
                self.category
                    .is_none_or(|c| p.category == c.as_backend_str())
            })
            .collect();

        match self.sort {
            SortOrder::Default => {}
            SortOrder::PriceAsc => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceDesc => matched.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Popularity => {
                matched.sort_by(|a, b| b.popularity.unwrap_or(0).cmp(&a.popularity.unwrap_or(0)));
            }
        }

        let total = matched.len();
        let limit = self.page.max(1).saturating_mul(self.per_page.max(1));
        matched.truncate(limit);
        let showing = matched.len();

        CatalogPage {
            products: matched,
            total,
            showing,
            has_more: showing < total,
        }
    }
}

/// Product counts per merchandised category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub total: usize,
    pub hoodies: usize,
    pub tshirts: usize,
    pub oversize_tshirts: usize,
}

impl CategoryCounts {
    /// Tally a product list.
    #[must_use]
    pub fn tally(products: &[Product]) -> Self {
        products.iter().fold(
            Self {
                total: products.len(),
                ..Self::default()
            },
            |mut counts, product| {
                match product.category_kind() {
                    Some(Category::Hoodies) => counts.hoodies += 1,
                    Some(Category::Tshirt) => counts.tshirts += 1,
                    Some(Category::OversizeTshirt) => counts.oversize_tshirts += 1,
                    None => {}
                }
                counts
            },
        )
    }
}
