//! Storefront checkout and order history against a fake commerce backend.

use loomwear_integration_tests::{
    FakeBackend, SHOPPER_EMAIL, client, location, log_in, start_storefront,
};
use reqwest::StatusCode;
use serde_json::json;

fn checkout_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("emailAddress", SHOPPER_EMAIL),
        ("firstName", "Asha"),
        ("lastName", "Rao"),
        ("company", "Acme"),
        ("address", "12 MG Road"),
        ("apartment", "4B"),
        ("city", "Bengaluru"),
        ("country", "India"),
        ("region", "Karnataka"),
        ("postalCode", "560001"),
        ("phone", "9999999999"),
        ("paymentType", "razorpay"),
    ]
}

/// Sign in as the shopper and put one medium red hoodie in the cart.
async fn shopper_with_hoodie(base_url: &str) -> reqwest::Client {
    let client = client();
    let resp = log_in(&client, base_url, SHOPPER_EMAIL).await;
    assert_eq!(location(&resp).as_deref(), Some("/user-profile"));

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[
            ("product_id", "p1"),
            ("size", "M"),
            ("color", "Red"),
            ("quantity", "1"),
        ])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(location(&resp).as_deref(), Some("/product/p1"));
    client
}

async fn page_text(client: &reqwest::Client, url: String) -> String {
    let resp = client.get(url).send().await.expect("Failed to get page");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.text().await.expect("Failed to read page")
}

#[tokio::test]
async fn test_placed_order_reaches_backend_and_confirms() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;
    let client = shopper_with_hoodie(&base_url).await;

    let resp = client
        .post(format!("{base_url}/checkout"))
        .form(&checkout_form())
        .send()
        .await
        .expect("Failed to submit checkout");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/order-confirmation"));

    let orders = backend.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user"]["id"], "u1");
    assert_eq!(orders[0]["user"]["email"], SHOPPER_EMAIL);
    assert_eq!(orders[0]["shippingInformation"]["city"], "Bengaluru");
    let items = &orders[0]["orderSummary"]["items"];
    assert_eq!(items[0]["product"], "p1");
    assert_eq!(items[0]["size"], "M");
    assert_eq!(items[0]["quantity"], 1);

    let body = page_text(&client, format!("{base_url}/order-confirmation")).await;
    assert!(body.contains("Order has been placed successfully"));
}

#[tokio::test]
async fn test_backend_failure_lands_on_order_failed() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;
    let client = shopper_with_hoodie(&base_url).await;
    backend.set_orders_down(true);

    let resp = client
        .post(format!("{base_url}/checkout"))
        .form(&checkout_form())
        .send()
        .await
        .expect("Failed to submit checkout");
    assert_eq!(location(&resp).as_deref(), Some("/order-failed"));
    assert!(backend.orders().is_empty());

    let body = page_text(&client, format!("{base_url}/order-failed")).await;
    assert!(body.contains("Failed to create the order. Please try again."));
}

#[tokio::test]
async fn test_missing_address_rerenders_form_with_entered_values() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;
    let client = shopper_with_hoodie(&base_url).await;

    let mut form = checkout_form();
    form.retain(|(name, _)| *name != "address");
    form.push(("address", "  "));

    let resp = client
        .post(format!("{base_url}/checkout"))
        .form(&form)
        .send()
        .await
        .expect("Failed to submit checkout");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read checkout page");
    assert!(body.contains("Address is required"));
    assert!(body.contains(r#"value="Bengaluru""#));
    assert!(backend.orders().is_empty());
}

#[tokio::test]
async fn test_order_history_lists_only_own_orders() {
    let backend = FakeBackend::start().await;
    backend.seed_order(json!({
        "_id": "ord-asha",
        "user": "u1",
        "orderSummary": {
            "items": [{ "product": "p1", "price": 1299, "quantity": 2, "size": "M" }],
            "subtotal": 2598, "shipping": 0, "taxes": "129.90", "total": "2727.90"
        },
        "status": "In Transit",
        "orderDate": "2024-10-05T10:00:00Z"
    }));
    backend.seed_order(json!({
        "_id": "ord-other",
        "user": { "id": "u9", "email": "someone@example.com" },
        "orderSummary": { "items": [], "total": 599 },
        "status": "Pending"
    }));
    let base_url = start_storefront(&backend).await;
    let client = client();
    log_in(&client, &base_url, SHOPPER_EMAIL).await;

    let body = page_text(&client, format!("{base_url}/order-history")).await;
    assert!(body.contains("ord-asha"));
    assert!(body.contains("In Transit"));
    assert!(!body.contains("ord-other"));
    assert!(!body.contains("You have not placed any orders yet."));
}

#[tokio::test]
async fn test_order_history_empty_state() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;
    let client = client();
    log_in(&client, &base_url, SHOPPER_EMAIL).await;

    let body = page_text(&client, format!("{base_url}/order-history")).await;
    assert!(body.contains("You have not placed any orders yet."));
}
