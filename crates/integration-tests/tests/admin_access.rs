//! Admin console access control against a fake commerce backend.

use loomwear_integration_tests::{
    ADMIN_EMAIL, FakeBackend, SHOPPER_EMAIL, client, location, log_in, start_admin,
};
use reqwest::StatusCode;

#[tokio::test]
async fn test_anonymous_requests_redirect_to_login() {
    let backend = FakeBackend::start().await;
    let base_url = start_admin(&backend).await;
    let client = client();

    for path in ["/", "/products", "/users", "/orders"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Request failed");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp).as_deref(), Some("/login"), "{path}");
    }
}

#[tokio::test]
async fn test_customer_login_is_refused() {
    let backend = FakeBackend::start().await;
    let base_url = start_admin(&backend).await;
    let client = client();

    let resp = log_in(&client, &base_url, SHOPPER_EMAIL).await;
    assert_eq!(location(&resp).as_deref(), Some("/login"));

    let page = client
        .get(format!("{base_url}/login"))
        .send()
        .await
        .expect("Failed to get login page")
        .text()
        .await
        .expect("Failed to read login page");
    assert!(page.contains("Access denied"));

    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(location(&resp).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_admin_reaches_dashboard_and_can_log_out() {
    let backend = FakeBackend::start().await;
    let base_url = start_admin(&backend).await;
    let client = client();

    let resp = log_in(&client, &base_url, ADMIN_EMAIL).await;
    assert_eq!(location(&resp).as_deref(), Some("/"));

    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get dashboard");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read dashboard");
    assert!(body.contains("Dashboard"));

    let resp = client
        .post(format!("{base_url}/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(location(&resp).as_deref(), Some("/login"));

    let resp = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to get products");
    assert_eq!(location(&resp).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_products_page_groups_by_category() {
    let backend = FakeBackend::start().await;
    let base_url = start_admin(&backend).await;
    let client = client();
    log_in(&client, &base_url, ADMIN_EMAIL).await;

    let body = client
        .get(format!("{base_url}/products"))
        .send()
        .await
        .expect("Failed to get products")
        .text()
        .await
        .expect("Failed to read products");

    let hoodies = body.find("Cloud Hoodie").expect("hoodie listed");
    let oversize = body.find("Drift Tee").expect("tee listed");
    assert!(hoodies < oversize);
}
