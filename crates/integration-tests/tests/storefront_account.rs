//! Storefront profile page when the backend cannot supply the profile.

use loomwear_integration_tests::{
    FakeBackend, SHOPPER_EMAIL, client, location, log_in, start_storefront,
};
use reqwest::StatusCode;

#[tokio::test]
async fn test_deleted_account_signs_out_instead_of_looping() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;
    let client = client();
    log_in(&client, &base_url, SHOPPER_EMAIL).await;
    backend.remove_user("u1");

    let resp = client
        .get(format!("{base_url}/user-profile"))
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/login"));

    let resp = client
        .get(format!("{base_url}/login"))
        .send()
        .await
        .expect("Failed to get login page");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read login page");
    assert!(body.contains("Error fetching user data"));

    let resp = client
        .get(format!("{base_url}/user-profile"))
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(location(&resp).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_profile_outage_renders_from_session() {
    let backend = FakeBackend::start().await;
    let base_url = start_storefront(&backend).await;
    let client = client();
    log_in(&client, &base_url, SHOPPER_EMAIL).await;
    backend.set_profiles_down(true);

    let resp = client
        .get(format!("{base_url}/user-profile"))
        .send()
        .await
        .expect("Failed to get profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read profile page");
    assert!(body.contains("Error fetching user data"));
    assert!(body.contains("Asha"));
}
