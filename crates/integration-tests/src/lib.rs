//! Integration tests for Loomwear.
//!
//! Each test starts an in-process fake of the commerce backend plus the
//! storefront or admin app under test, both on ephemeral ports, and drives the
//! app over HTTP with a cookie-holding client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p loomwear-integration-tests
//! ```
//!
//! No database is needed: the apps run over an in-memory session store.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use loomwear_backend::BackendConfig;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;

pub const SHOPPER_EMAIL: &str = "asha@example.com";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "secret1";

/// Message the fake returns while cart endpoints are failing.
pub const CART_DOWN_MESSAGE: &str = "Cart service unavailable";

/// Message the fake returns while order creation is failing.
pub const ORDERS_DOWN_MESSAGE: &str = "Order service unavailable";

// =============================================================================
// Fake Backend
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCartItem {
    pub user_id: String,
    pub product_id: String,
    pub size: String,
    pub color: String,
    pub quantity: u64,
}

#[derive(Debug, Default)]
struct FakeState {
    users: Vec<Value>,
    products: Vec<Value>,
    cart: Vec<FakeCartItem>,
    orders: Vec<Value>,
    cart_down: bool,
    profiles_down: bool,
    orders_down: bool,
}

/// Handle to a running fake backend.
#[derive(Clone)]
pub struct FakeBackend {
    pub url: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    /// Start a fake seeded with one shopper, one admin and two products.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState {
            users: vec![
                json!({
                    "_id": "u1", "firstName": "Asha", "lastName": "Rao",
                    "email": SHOPPER_EMAIL, "role": "user"
                }),
                json!({
                    "_id": "a1", "firstName": "Dev", "lastName": "Mehta",
                    "email": ADMIN_EMAIL, "role": "admin"
                }),
            ],
            products: vec![
                json!({
                    "_id": "p1", "name": "Cloud Hoodie", "description": "Brushed fleece",
                    "category": "Hoodies", "gender": "Unisex", "price": 1299, "stock": 10,
                    "size": ["S", "M", "L"], "color": ["Red", "Black"], "images": ["/img/p1.jpg"]
                }),
                json!({
                    "_id": "p2", "name": "Drift Tee", "description": "Heavy cotton",
                    "category": "Oversize-Tshirt", "gender": "Male", "price": 599, "stock": 8,
                    "size": ["M", "L"], "color": ["Blue"], "images": ["/img/p2.jpg"]
                }),
            ],
            ..FakeState::default()
        }));

        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/api/auth/login", post(login))
            .route("/api/auth/getuser/{id}", get(get_user))
            .route("/api/auth/getusers", get(list_users))
            .route("/api/product/getproducts", get(list_products))
            .route("/api/product/getproduct/{id}", get(get_product))
            .route("/api/cart/cart/{user_id}", get(get_cart))
            .route("/api/cart/add-to-cart", post(add_to_cart))
            .route("/api/order/orders", get(list_orders))
            .route("/api/order/create-order", post(create_order))
            .with_state(Arc::clone(&state));

        let url = serve(router).await;
        Self { url, state }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend state poisoned")
    }

    /// Put a line straight into the persisted cart.
    pub fn seed_cart(&self, item: FakeCartItem) {
        self.lock().cart.push(item);
    }

    pub fn clear_cart(&self) {
        self.lock().cart.clear();
    }

    /// Persisted cart lines for `user_id`.
    pub fn cart_for(&self, user_id: &str) -> Vec<FakeCartItem> {
        self.lock()
            .cart
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Make every cart endpoint answer 500.
    pub fn set_cart_down(&self, down: bool) {
        self.lock().cart_down = down;
    }

    /// Drop a user account, as an administrator deleting it would.
    pub fn remove_user(&self, id: &str) {
        self.lock().users.retain(|u| u["_id"] != id);
    }

    /// Make `GET /api/auth/getuser/{id}` answer 500.
    pub fn set_profiles_down(&self, down: bool) {
        self.lock().profiles_down = down;
    }

    /// Make order creation answer 500.
    pub fn set_orders_down(&self, down: bool) {
        self.lock().orders_down = down;
    }

    /// Store an order as the backend would return it.
    pub fn seed_order(&self, order: Value) {
        self.lock().orders.push(order);
    }

    /// Every stored order, seeded or created.
    pub fn orders(&self) -> Vec<Value> {
        self.lock().orders.clone()
    }

    /// Backend config pointing at this fake, with caching off.
    pub fn config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.url.clone(),
            timeout: Duration::from_secs(5),
            cache_ttl: None,
        }
    }
}

type Shared = State<Arc<Mutex<FakeState>>>;

fn locked(state: &Arc<Mutex<FakeState>>) -> MutexGuard<'_, FakeState> {
    state.lock().expect("fake backend state poisoned")
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn login(State(state): Shared, Json(body): Json<Value>) -> Response {
    let state = locked(&state);
    let user = state
        .users
        .iter()
        .find(|u| u["email"] == body["email"] && body["password"] == PASSWORD);
    match user {
        Some(user) => Json(json!({ "id": user["_id"], "role": user["role"] })).into_response(),
        None => message(StatusCode::BAD_REQUEST, "Invalid email or password"),
    }
}

async fn get_user(State(state): Shared, Path(id): Path<String>) -> Response {
    let state = locked(&state);
    if state.profiles_down {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "User service unavailable");
    }
    match state.users.iter().find(|u| u["_id"] == id.as_str()) {
        Some(user) => Json(user.clone()).into_response(),
        None => message(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn list_users(State(state): Shared) -> Json<Value> {
    Json(Value::from(locked(&state).users.clone()))
}

async fn list_products(State(state): Shared) -> Json<Value> {
    Json(Value::from(locked(&state).products.clone()))
}

async fn get_product(State(state): Shared, Path(id): Path<String>) -> Response {
    let state = locked(&state);
    match state.products.iter().find(|p| p["_id"] == id.as_str()) {
        Some(product) => Json(product.clone()).into_response(),
        None => message(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn list_orders(State(state): Shared) -> Json<Value> {
    Json(Value::from(locked(&state).orders.clone()))
}

/// Stores the order with a generated id and answers 201.
async fn create_order(State(state): Shared, Json(mut order): Json<Value>) -> Response {
    let mut state = locked(&state);
    if state.orders_down {
        return message(StatusCode::INTERNAL_SERVER_ERROR, ORDERS_DOWN_MESSAGE);
    }
    order["_id"] = json!(format!("o{}", state.orders.len() + 1));
    order["status"] = json!("Pending");
    state.orders.push(order);
    message(StatusCode::CREATED, "Order created")
}

async fn get_cart(State(state): Shared, Path(user_id): Path<String>) -> Response {
    let state = locked(&state);
    if state.cart_down {
        return message(StatusCode::INTERNAL_SERVER_ERROR, CART_DOWN_MESSAGE);
    }
    let items: Vec<Value> = state
        .cart
        .iter()
        .filter(|i| i.user_id == user_id)
        .map(|i| {
            let product = state
                .products
                .iter()
                .find(|p| p["_id"] == i.product_id.as_str())
                .cloned();
            json!({
                "product": product,
                "quantity": i.quantity,
                "size": i.size,
                "color": i.color,
            })
        })
        .collect();
    Json(json!({ "cart": { "items": items } })).into_response()
}

/// Merges quantities for a repeated product, size and color.
async fn add_to_cart(State(state): Shared, Json(body): Json<Value>) -> Response {
    let mut state = locked(&state);
    if state.cart_down {
        return message(StatusCode::INTERNAL_SERVER_ERROR, CART_DOWN_MESSAGE);
    }
    let user_id = body["userId"].as_str().unwrap_or_default().to_owned();
    let cart = &mut state.cart;
    for item in body["items"].as_array().into_iter().flatten() {
        let incoming = FakeCartItem {
            user_id: user_id.clone(),
            product_id: item["id"].as_str().unwrap_or_default().to_owned(),
            size: item["size"].as_str().unwrap_or_default().to_owned(),
            color: item["color"].as_str().unwrap_or_default().to_owned(),
            quantity: item["quantity"].as_u64().unwrap_or(1),
        };
        match cart.iter_mut().find(|i| {
            i.user_id == incoming.user_id
                && i.product_id == incoming.product_id
                && i.size == incoming.size
                && i.color == incoming.color
        }) {
            Some(existing) => existing.quantity += incoming.quantity,
            None => cart.push(incoming),
        }
    }
    message(StatusCode::OK, "Product added to cart")
}

// =============================================================================
// Apps Under Test
// =============================================================================

/// Serve `router` on an ephemeral port and return its base URL.
///
/// Connect info is attached because the storefront rate limiters key on the
/// peer address.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no local address");
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Test server failed");
    });
    format!("http://{addr}")
}

/// Start the storefront against `backend`; returns its base URL.
pub async fn start_storefront(backend: &FakeBackend) -> String {
    use loomwear_storefront::config::StorefrontConfig;
    use loomwear_storefront::state::AppState;

    let config = StorefrontConfig {
        database_url: SecretString::from("postgres://unused"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost".to_string(),
        backend: backend.config(),
        cart_poll_interval: Duration::from_secs(5),
        admin_console_url: "http://localhost:3001".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
    };
    let state = AppState::new(config).expect("Failed to build storefront state");
    serve(loomwear_storefront::app(state, MemoryStore::default())).await
}

/// Start the admin console against `backend`; returns its base URL.
pub async fn start_admin(backend: &FakeBackend) -> String {
    use loomwear_admin::config::AdminConfig;
    use loomwear_admin::state::AppState;

    let config = AdminConfig {
        database_url: SecretString::from("postgres://unused"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost".to_string(),
        backend: backend.config(),
        json_logs: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    };
    let state = AppState::new(config).expect("Failed to build admin state");
    serve(loomwear_admin::app(state, MemoryStore::default())).await
}

/// Cookie-holding client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// `Location` header of a redirect response.
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Submit the login form at `base_url`.
pub async fn log_in(client: &reqwest::Client, base_url: &str, email: &str) -> reqwest::Response {
    client
        .post(format!("{base_url}/login"))
        .form(&[("email", email), ("password", PASSWORD)])
        .send()
        .await
        .expect("Login request failed")
}
