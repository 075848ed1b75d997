//! Backend REST client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP. Product reads are optionally cached with
//! `moka`; every product mutation invalidates the cache.

use std::sync::Arc;
use std::time::Duration;

use loomwear_core::cart::CartLine;
use loomwear_core::catalog::{Product, ProductDraft};
use loomwear_core::order::{NewOrder, Order};
use loomwear_core::user::{Credentials, PasswordReset, ProfileUpdate, Registration, User};
use loomwear_core::{OrderId, OrderStatus, ProductId, UserId};
use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::BackendError;
use crate::cache::{CacheKey, CacheValue};
use crate::types::{
    AddToCartRequest, CartEnvelope, ImageUpload, ImageUploadResponse, LoginResponse,
    MessageResponse, RemoveCartItemRequest, UpdateCartItemRequest, UpdateStatusRequest,
};

/// Connection settings for [`BackendClient`].
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://localhost:5000`. A trailing slash is ignored.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Product cache TTL. `None` disables caching.
    pub cache_ttl: Option<Duration>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(15),
            cache_ttl: None,
        }
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the commerce backend REST API.
///
/// Cheap to clone; all clones share one connection pool and cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = config.cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let path = response.url().path().to_string();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status.is_success() {
            return Ok(response_text);
        }

        let message = serde_json::from_str::<MessageResponse>(&response_text)
            .ok()
            .and_then(|m| m.message)
            .unwrap_or_else(|| truncate(&response_text, 200));

        if status == StatusCode::NOT_FOUND {
            debug!(path = %path, "Backend resource not found");
            return Err(BackendError::NotFound(if message.is_empty() {
                path
            } else {
                message
            }));
        }

        tracing::warn!(
            status = %status,
            path = %path,
            body = %truncate(&response_text, 500),
            "Backend returned non-success status"
        );
        Err(BackendError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Send a request and parse its JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response_text = self.send(request).await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&response_text, 500),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    /// Send a request whose response body is not needed.
    async fn execute_unit(&self, request: RequestBuilder) -> Result<(), BackendError> {
        self.send(request).await.map(|_| ())
    }

    /// Check that the backend is reachable. Any HTTP response counts.
    ///
    /// # Errors
    ///
    /// Returns an error if no response is received.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), BackendError> {
        self.inner.client.get(self.url("/")).send().await?;
        Ok(())
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Status`] carrying the backend's message for bad
    /// credentials, or another error if the request fails.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/auth/login"))
            .json(credentials);
        self.execute(request).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/auth/register"))
            .json(registration);
        self.execute_unit(request).await
    }

    /// Set a new password for the account with the given email.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the reset.
    #[instrument(skip(self, reset), fields(email = %reset.email))]
    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/auth/reset-password"))
            .json(reset);
        self.execute_unit(request).await
    }

    /// Fetch a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not found or the request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &UserId) -> Result<User, BackendError> {
        let request = self
            .inner
            .client
            .get(self.url(&format!("/api/auth/getuser/{id}")));
        self.execute(request).await
    }

    /// Update a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_user(&self, id: &UserId, update: &ProfileUpdate) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .put(self.url(&format!("/api/auth/updateuser/{id}")))
            .json(update);
        self.execute_unit(request).await
    }

    /// List every user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, BackendError> {
        let request = self.inner.client.get(self.url("/api/auth/getusers"));
        self.execute(request).await
    }

    /// Delete a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .delete(self.url(&format!("/api/auth/deleteuser/{id}")));
        self.execute_unit(request).await
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Products(products)) = cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let request = self.inner.client.get(self.url("/api/product/getproducts"));
        let products: Vec<Product> = self.execute(request).await?;

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(CacheKey::Products, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Product(product)) = cache.get(&cache_key).await
        {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let request = self
            .inner
            .client
            .get(self.url(&format!("/api/product/getproduct/{id}")));
        let product: Product = self.execute(request).await?;

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
                .await;
        }

        Ok(product)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the product.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/product/addproduct"))
            .json(draft);
        self.execute_unit(request).await?;
        self.invalidate_products().await;
        Ok(())
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, draft: &ProductDraft) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .put(self.url(&format!("/api/product/updateproduct/{id}")))
            .json(draft);
        self.execute_unit(request).await?;
        self.invalidate_products().await;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .delete(self.url(&format!("/api/product/deleteproduct/{id}")));
        self.execute_unit(request).await?;
        self.invalidate_products().await;
        Ok(())
    }

    /// Upload product images; returns their public URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if a content type is invalid or the upload fails.
    #[instrument(skip(self, images), fields(count = images.len()))]
    pub async fn upload_images(&self, images: Vec<ImageUpload>) -> Result<Vec<String>, BackendError> {
        let mut form = reqwest::multipart::Form::new();
        for image in images {
            let part = reqwest::multipart::Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)?;
            form = form.part("images", part);
        }

        let request = self
            .inner
            .client
            .post(self.url("/api/product/image-upload"))
            .multipart(form);
        let response: ImageUploadResponse = self.execute(request).await?;
        Ok(response.image_urls)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Fetch a user's persisted cart.
    ///
    /// A user with no cart yet gets an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &UserId) -> Result<Vec<CartLine>, BackendError> {
        let request = self
            .inner
            .client
            .get(self.url(&format!("/api/cart/cart/{user_id}")));
        match self.execute::<CartEnvelope>(request).await {
            Ok(envelope) => Ok(envelope.into_lines()),
            Err(BackendError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Add a line to a user's persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the line.
    #[instrument(skip(self, line), fields(user_id = %user_id, product_id = %line.product_id))]
    pub async fn add_to_cart(&self, user_id: &UserId, line: &CartLine) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/cart/add-to-cart"))
            .json(&AddToCartRequest::for_line(user_id.clone(), line));
        self.execute_unit(request).await
    }

    /// Remove a product from a user's persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_cart_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/cart/cart/remove-item"))
            .json(&RemoveCartItemRequest {
                user_id: user_id.clone(),
                product_id: product_id.clone(),
            });
        self.execute_unit(request).await
    }

    /// Set the quantity of a product in a user's persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn update_cart_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/cart/cart/update-item"))
            .json(&UpdateCartItemRequest {
                user_id: user_id.clone(),
                product_id: product_id.clone(),
                quantity,
            });
        self.execute_unit(request).await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend does not accept the order.
    #[instrument(skip(self, order), fields(user_id = %order.user.id()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/order/create-order"))
            .json(order);
        self.execute_unit(request).await
    }

    /// List every order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, BackendError> {
        let request = self.inner.client.get(self.url("/api/order/orders"));
        self.execute(request).await
    }

    /// List the orders placed by one user.
    ///
    /// The backend has no per-user endpoint, so this filters the full list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, BackendError> {
        let orders = self.list_orders().await?;
        Ok(orders.into_iter().filter(|o| o.belongs_to(user_id)).collect())
    }

    /// Get a single order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, BackendError> {
        let request = self
            .inner
            .client
            .get(self.url(&format!("/api/order/order/{id}")));
        self.execute(request).await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(&self, id: &OrderId, status: &OrderStatus) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .patch(self.url(&format!("/api/order/update-status/{id}")))
            .json(&UpdateStatusRequest {
                status: status.clone(),
            });
        self.execute_unit(request).await
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: &OrderId) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .delete(self.url(&format!("/api/order/delete-order/{id}")));
        self.execute_unit(request).await
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate all cached product data.
    pub async fn invalidate_products(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    async fn serve(router: Router) -> BackendClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        BackendClient::new(&BackendConfig {
            base_url: format!("http://{addr}/"),
            timeout: Duration::from_secs(5),
            cache_ttl: Some(Duration::from_secs(60)),
        })
        .unwrap()
    }

    fn product_json(id: &str) -> Value {
        json!({"_id": id, "name": format!("Product {id}"), "price": 100, "stock": 5})
    }

    #[tokio::test]
    async fn test_get_cart_maps_lines() {
        let router = Router::new().route(
            "/api/cart/cart/{user_id}",
            get(|| async {
                Json(json!({"cart": {"items": [
                    {"product": product_json("p1"), "quantity": 3, "size": "M", "color": "Red"}
                ]}}))
            }),
        );
        let client = serve(router).await;
        let lines = client.get_cart(&UserId::new("u1")).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].size, "M");
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty() {
        let router = Router::new().route(
            "/api/cart/cart/{user_id}",
            get(|| async { (AxumStatus::NOT_FOUND, Json(json!({"message": "Cart not found"}))) }),
        );
        let client = serve(router).await;
        assert!(client.get_cart(&UserId::new("u1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_carries_backend_message() {
        let router = Router::new().route(
            "/api/auth/login",
            post(|| async {
                (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({"message": "Invalid credentials"})),
                )
            }),
        );
        let client = serve(router).await;
        let credentials = Credentials {
            email: loomwear_core::Email::parse("a@b.co").unwrap(),
            password: "secret1".to_string(),
        };
        let err = client.login(&credentials).await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 400, .. }));
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_orders_for_user_filters_by_user() {
        let router = Router::new().route(
            "/api/order/orders",
            get(|| async {
                Json(json!([
                    {"_id": "o1", "user": "u1", "status": "Pending"},
                    {"_id": "o2", "user": "u2", "status": "Delivered"},
                    {"_id": "o3", "user": "u1", "status": "In Transit"}
                ]))
            }),
        );
        let client = serve(router).await;
        let orders = client.orders_for_user(&UserId::new("u1")).await.unwrap();
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o3"]);
    }

    #[tokio::test]
    async fn test_product_list_is_cached_until_mutation() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/api/product/getproducts",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!([product_json("p1")]))
                }),
            )
            .route(
                "/api/product/deleteproduct/{id}",
                delete(|| async { Json(json!({"message": "deleted"})) }),
            )
            .with_state(Arc::clone(&hits));
        let client = serve(router).await;

        client.list_products().await.unwrap();
        client.list_products().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        client.delete_product(&ProductId::new("p1")).await.unwrap();
        client.list_products().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_is_http_error() {
        let client = BackendClient::new(&BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            cache_ttl: None,
        })
        .unwrap();
        let err = client.list_orders().await.unwrap_err();
        assert!(matches!(err, BackendError::Http(_)));
        assert!(client.ping().await.is_err());
    }
}
