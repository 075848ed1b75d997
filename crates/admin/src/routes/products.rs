//! Product management.
//!
//! Products are created and edited through one multipart form. New image files
//! are forwarded to the backend upload endpoint first; the returned URLs are
//! appended to the images the admin chose to keep.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use loomwear_backend::ImageUpload;
use loomwear_core::ProductId;
use loomwear_core::catalog::{Category, Product, ProductDraft};
use rust_decimal::Decimal;
use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentAdmin;
use crate::notices;
use crate::state::AppState;
use crate::views::{ConfirmTemplate, PageContext};

pub const SIZES: [&str; 4] = ["S", "M", "L", "XL"];
pub const COLORS: [&str; 4] = ["Red", "Blue", "Green", "Black"];
pub const GENDERS: [&str; 3] = ["Unisex", "Male", "Female"];

/// Request body cap for the product form, images included.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub const LOAD_FAILED_NOTICE: &str = "Failed to load products.";
pub const FETCH_FAILED_NOTICE: &str = "Failed to fetch product details";
pub const UPLOAD_FAILED_NOTICE: &str = "Failed to upload images.";
pub const ADDED_NOTICE: &str = "Product added successfully!";
pub const ADD_FAILED_NOTICE: &str = "Error adding product.";
pub const UPDATED_NOTICE: &str = "Product Updated successfully";
pub const UPDATE_FAILED_NOTICE: &str = "Error updating product.";
pub const DELETED_NOTICE: &str = "Product deleted successfully!";

// =============================================================================
// Form
// =============================================================================

/// Problems with a submitted product form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductFormError {
    #[error("Product name is required")]
    MissingName,
    #[error("Description is required")]
    MissingDescription,
    #[error("Please choose a valid category")]
    UnknownCategory,
    #[error("Please choose a valid gender")]
    UnknownGender,
    #[error("Price must be a number of zero or more")]
    InvalidPrice,
    #[error("Stock must be a whole number of zero or more")]
    InvalidStock,
    #[error("{0} is not an image")]
    NotAnImage(String),
}

/// Raw product form fields, kept as strings so a rejected form re-renders
/// exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub category: String,
    /// Category the product had when the edit form was opened. It stays
    /// selectable even when it is not one of the known categories.
    pub stored_category: String,
    pub gender: String,
    pub price: String,
    pub stock: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    /// Images the product already had when the form was opened.
    pub existing_images: Vec<String>,
    /// Subset of `existing_images` still checked.
    pub keep_images: Vec<String>,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: Category::Hoodies.as_backend_str().to_string(),
            stored_category: String::new(),
            gender: "Unisex".to_string(),
            price: "0".to_string(),
            stock: "0".to_string(),
            sizes: Vec::new(),
            colors: Vec::new(),
            existing_images: Vec::new(),
            keep_images: Vec::new(),
        }
    }
}

impl ProductForm {
    /// Prefill the edit form from a stored product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            stored_category: product.category.clone(),
            gender: product.gender.clone(),
            price: product.price.to_string(),
            stock: product.stock.to_string(),
            sizes: product.sizes.clone(),
            colors: product.colors.clone(),
            existing_images: product.images.clone(),
            keep_images: product.images.clone(),
        }
    }

    fn set(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "description" => self.description = value,
            "category" => self.category = value,
            "stored_category" => self.stored_category = value,
            "gender" => self.gender = value,
            "price" => self.price = value,
            "stock" => self.stock = value,
            "size" => self.sizes.push(value),
            "color" => self.colors.push(value),
            "existing_image" => self.existing_images.push(value),
            "keep_image" => self.keep_images.push(value),
            other => tracing::debug!(field = other, "Ignoring unknown product form field"),
        }
    }

    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }

    /// Stored category outside the known set, offered as an extra option.
    #[must_use]
    pub fn legacy_category(&self) -> Option<&str> {
        let stored = self.stored_category.trim();
        (!stored.is_empty() && Category::parse(stored).is_none()).then_some(stored)
    }

    #[must_use]
    pub fn keeps(&self, image: &str) -> bool {
        self.keep_images.iter().any(|i| i == image)
    }

    /// Validate into a backend payload carrying only the kept images.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field, checked in form order.
    pub fn to_draft(&self) -> std::result::Result<ProductDraft, ProductFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductFormError::MissingName);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ProductFormError::MissingDescription);
        }
        let category = match Category::parse(self.category.trim()) {
            Some(known) => known.as_backend_str(),
            None => self
                .legacy_category()
                .filter(|legacy| *legacy == self.category.trim())
                .ok_or(ProductFormError::UnknownCategory)?,
        };
        let gender = GENDERS
            .into_iter()
            .find(|g| g.eq_ignore_ascii_case(self.gender.trim()))
            .ok_or(ProductFormError::UnknownGender)?;
        let price = self
            .price
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|p| !p.is_sign_negative())
            .ok_or(ProductFormError::InvalidPrice)?;
        let stock = self
            .stock
            .trim()
            .parse::<u32>()
            .map_err(|_| ProductFormError::InvalidStock)?;

        Ok(ProductDraft {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            gender: gender.to_string(),
            price,
            stock,
            sizes: self.sizes.clone(),
            colors: self.colors.clone(),
            images: self.keep_images.clone(),
        })
    }
}

/// Reject uploads that are not images before anything is sent upstream.
fn check_uploads(uploads: &[ImageUpload]) -> std::result::Result<(), ProductFormError> {
    match uploads
        .iter()
        .find(|u| !u.content_type.starts_with("image/"))
    {
        Some(upload) => Err(ProductFormError::NotAnImage(upload.file_name.clone())),
        None => Ok(()),
    }
}

/// Split the multipart body into text fields and image files.
///
/// Empty file inputs (no file chosen) are skipped.
async fn read_form(
    mut multipart: Multipart,
) -> std::result::Result<(ProductForm, Vec<ImageUpload>), MultipartError> {
    let mut form = ProductForm::default();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "images" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field.bytes().await?;
            if file_name.is_empty() || bytes.is_empty() {
                continue;
            }
            uploads.push(ImageUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await?;
            form.set(&name, value);
        }
    }

    Ok((form, uploads))
}

// =============================================================================
// Templates
// =============================================================================

/// Products of one category, for the grouped listing.
#[derive(Debug, Clone)]
pub struct ProductGroup {
    pub title: String,
    pub products: Vec<Product>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub page: PageContext,
    pub groups: Vec<ProductGroup>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub page: PageContext,
    pub heading: &'static str,
    pub action: String,
    pub form: ProductForm,
    pub categories: [Category; 3],
    pub genders: [&'static str; 3],
    pub sizes: [&'static str; 4],
    pub colors: [&'static str; 4],
}

impl ProductFormTemplate {
    fn new(page: PageContext, heading: &'static str, action: String, form: ProductForm) -> Self {
        Self {
            page,
            heading,
            action,
            form,
            categories: Category::ALL,
            genders: GENDERS,
            sizes: SIZES,
            colors: COLORS,
        }
    }
}

/// Group products under the three merchandised categories, in display order.
///
/// Products with any other category are listed last under "Other".
#[must_use]
pub fn group_by_category(products: Vec<Product>) -> Vec<ProductGroup> {
    let mut groups: Vec<ProductGroup> = Category::ALL
        .into_iter()
        .map(|c| ProductGroup {
            title: c.as_backend_str().to_string(),
            products: Vec::new(),
        })
        .collect();
    let mut other = Vec::new();

    for product in products {
        let slot = product
            .category_kind()
            .and_then(|kind| Category::ALL.iter().position(|c| *c == kind))
            .and_then(|index| groups.get_mut(index));
        match slot {
            Some(group) => group.products.push(product),
            None => other.push(product),
        }
    }

    if !other.is_empty() {
        groups.push(ProductGroup {
            title: "Other".to_string(),
            products: other,
        });
    }
    groups
}

// =============================================================================
// Router
// =============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/new", get(new_form))
        .route("/products/{id}", post(update))
        .route("/products/{id}/edit", get(edit))
        .route("/products/{id}/delete", get(confirm_delete).post(delete))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /products
#[instrument(skip_all)]
async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> ProductsTemplate {
    let products = match state.backend().list_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products");
            notices::error(&session, LOAD_FAILED_NOTICE).await;
            Vec::new()
        }
    };

    ProductsTemplate {
        page: PageContext::build(&session, Some(admin), "products").await,
        groups: group_by_category(products),
    }
}

/// GET /products/new
async fn new_form(session: Session, RequireAdmin(admin): RequireAdmin) -> ProductFormTemplate {
    ProductFormTemplate::new(
        PageContext::build(&session, Some(admin), "products").await,
        "Add Product",
        "/products".to_string(),
        ProductForm::default(),
    )
}

/// GET /products/{id}/edit
#[instrument(skip(state, session, admin))]
async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Response {
    let product = match state.backend().get_product(&id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch product");
            notices::error(&session, FETCH_FAILED_NOTICE).await;
            return Redirect::to("/products").into_response();
        }
    };

    ProductFormTemplate::new(
        PageContext::build(&session, Some(admin), "products").await,
        "Update Product",
        format!("/products/{id}"),
        ProductForm::from_product(&product),
    )
    .into_response()
}

/// Validate, upload new images, and return the payload to submit.
///
/// On failure the notice is already queued and the form is handed back for
/// re-rendering.
async fn prepare(
    state: &AppState,
    session: &Session,
    form: ProductForm,
    uploads: Vec<ImageUpload>,
) -> std::result::Result<ProductDraft, ProductForm> {
    let checked = form
        .to_draft()
        .and_then(|draft| check_uploads(&uploads).map(|()| draft));
    let mut draft = match checked {
        Ok(draft) => draft,
        Err(e) => {
            notices::error(session, e.to_string()).await;
            return Err(form);
        }
    };

    if !uploads.is_empty() {
        match state.backend().upload_images(uploads).await {
            Ok(urls) => draft.images.extend(urls),
            Err(e) => {
                tracing::warn!(error = %e, "Image upload failed");
                notices::error(session, UPLOAD_FAILED_NOTICE).await;
                return Err(form);
            }
        }
    }
    Ok(draft)
}

async fn rerender(
    session: &Session,
    admin: CurrentAdmin,
    heading: &'static str,
    action: String,
    form: ProductForm,
) -> Response {
    ProductFormTemplate::new(
        PageContext::build(session, Some(admin), "products").await,
        heading,
        action,
        form,
    )
    .into_response()
}

/// POST /products
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Response> {
    let (form, uploads) = read_form(multipart).await?;
    let draft = match prepare(&state, &session, form.clone(), uploads).await {
        Ok(draft) => draft,
        Err(form) => {
            return Ok(rerender(&session, admin, "Add Product", "/products".to_string(), form).await);
        }
    };

    match state.backend().create_product(&draft).await {
        Ok(()) => {
            tracing::info!(name = %draft.name, "Product created");
            notices::success(&session, ADDED_NOTICE).await;
            Ok(Redirect::to("/products").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create product");
            notices::error(&session, ADD_FAILED_NOTICE).await;
            Ok(rerender(&session, admin, "Add Product", "/products".to_string(), form).await)
        }
    }
}

/// POST /products/{id}
#[instrument(skip(state, session, admin, multipart))]
async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response> {
    let action = format!("/products/{id}");
    let (form, uploads) = read_form(multipart).await?;
    let draft = match prepare(&state, &session, form.clone(), uploads).await {
        Ok(draft) => draft,
        Err(form) => return Ok(rerender(&session, admin, "Update Product", action, form).await),
    };

    match state.backend().update_product(&id, &draft).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product updated");
            notices::success(&session, UPDATED_NOTICE).await;
            Ok(Redirect::to("/products").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to update product");
            notices::error(&session, UPDATE_FAILED_NOTICE).await;
            Ok(rerender(&session, admin, "Update Product", action, form).await)
        }
    }
}

/// GET /products/{id}/delete
async fn confirm_delete(
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> ConfirmTemplate {
    ConfirmTemplate {
        page: PageContext::build(&session, Some(admin), "products").await,
        heading: "Delete product".to_string(),
        message: "Are you sure you want to delete this product?".to_string(),
        action: format!("/products/{id}/delete"),
        cancel: "/products".to_string(),
    }
}

/// POST /products/{id}/delete
#[instrument(skip(state, session, _admin))]
async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Redirect {
    match state.backend().delete_product(&id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product deleted");
            notices::success(&session, DELETED_NOTICE).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete product");
            notices::error(
                &session,
                format!("Error deleting product: {}", e.user_message()),
            )
            .await;
        }
    }
    Redirect::to("/products")
}
