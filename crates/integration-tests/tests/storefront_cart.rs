//! Storefront cart flows against a fake commerce backend.

use loomwear_integration_tests::{
    CART_DOWN_MESSAGE, FakeBackend, FakeCartItem, SHOPPER_EMAIL, client, location, log_in,
    start_storefront,
};
use reqwest::StatusCode;

fn add_form(quantity: &str) -> [(&'static str, String); 4] {
    [
        ("product_id", "p1".to_string()),
        ("size", "M".to_string()),
        ("color", "Red".to_string()),
        ("quantity", quantity.to_string()),
    ]
}

async fn badge(client: &reqwest::Client, base_url: &str) -> String {
    client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to fetch cart badge")
        .text()
        .await
        .expect("Failed to read cart badge")
}

#[tokio::test]
async fn test_checkout_redirects_guests_to_login() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;

    let resp = client()
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_guest_add_to_cart_is_sent_to_login() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;

    let resp = client()
        .post(format!("{base_url}/cart/add"))
        .form(&add_form("1"))
        .send()
        .await
        .expect("Failed to add to cart");

    assert_eq!(location(&resp).as_deref(), Some("/login"));
    assert!(backend.cart_for("u1").is_empty());
}

#[tokio::test]
async fn test_adding_same_variant_twice_merges_quantity() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;
    let client = client();

    let resp = log_in(&client, &base_url, SHOPPER_EMAIL).await;
    assert_eq!(location(&resp).as_deref(), Some("/user-profile"));

    for _ in 0..2 {
        let resp = client
            .post(format!("{base_url}/cart/add"))
            .form(&add_form("1"))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(location(&resp).as_deref(), Some("/product/p1"));
    }

    let lines = backend.cart_for("u1");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 2);
    assert!(badge(&client, &base_url).await.contains(">2<"));
}

#[tokio::test]
async fn test_cart_page_replaces_session_cart_with_server_cart() {
    let backend = FakeBackend::start().await;
    backend.seed_cart(FakeCartItem {
        user_id: "u1".to_string(),
        product_id: "p2".to_string(),
        size: "L".to_string(),
        color: "Blue".to_string(),
        quantity: 3,
    });
    let base_url = start_storefront(&backend).await;
    let client = client();
    log_in(&client, &base_url, SHOPPER_EMAIL).await;

    let body = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart")
        .text()
        .await
        .expect("Failed to read cart");
    assert!(body.contains("Drift Tee"));

    backend.clear_cart();
    let body = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart")
        .text()
        .await
        .expect("Failed to read cart");
    assert!(body.contains("Your cart is empty."));
    assert!(!body.contains("Drift Tee"));
}

#[tokio::test]
async fn test_failed_backend_add_keeps_local_line_and_shows_notice() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;
    let client = client();
    log_in(&client, &base_url, SHOPPER_EMAIL).await;

    backend.set_cart_down(true);
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&add_form("1"))
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(location(&resp).as_deref(), Some("/product/p1"));

    let page = client
        .get(format!("{base_url}/product/p1"))
        .send()
        .await
        .expect("Failed to get product page")
        .text()
        .await
        .expect("Failed to read product page");
    assert!(page.contains(CART_DOWN_MESSAGE));

    // The badge falls back to the session mirror while the backend is down.
    assert!(badge(&client, &base_url).await.contains(">1<"));
    assert!(backend.cart_for("u1").is_empty());
}

#[tokio::test]
async fn test_quantity_above_stock_is_rejected_before_backend_call() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;
    let client = client();
    log_in(&client, &base_url, SHOPPER_EMAIL).await;

    client
        .post(format!("{base_url}/cart/add"))
        .form(&add_form("11"))
        .send()
        .await
        .expect("Failed to add to cart");

    assert!(backend.cart_for("u1").is_empty());
}

#[tokio::test]
async fn test_unoffered_variant_falls_back_to_first_offered() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;
    let client = client();
    log_in(&client, &base_url, SHOPPER_EMAIL).await;

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[
            ("product_id", "p1"),
            ("size", "XXL"),
            ("color", "Green"),
            ("quantity", "1"),
        ])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(location(&resp).as_deref(), Some("/product/p1"));

    let lines = backend.cart_for("u1");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].size, "S");
    assert_eq!(lines[0].color, "Red");
}
