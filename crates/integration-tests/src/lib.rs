//! Integration tests for Mu Shop.
//!
//! # Running Tests
//!
//! These tests drive a running server over HTTP. Start the stack first:
//!
//! ```bash
//! # Database up and migrated
//! cargo run -p mu-cli -- migrate
//!
//! # An admin to exercise the admin endpoints
//! cargo run -p mu-cli -- admin create \
//!     -e admin@example.com -n "Test Admin" -p admin-password-1
//!
//! # The API server
//! cargo run -p mu-shop-api
//!
//! # Then run the ignored tests
//! cargo test -p mu-shop-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_TEST_BASE_URL` - API base URL (default `http://localhost:3000`)
//! - `SHOP_TEST_ADMIN_EMAIL` / `SHOP_TEST_ADMIN_PASSWORD` - Credentials of
//!   a provisioned admin (defaults match the command above)

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SHOP_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Plain HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::new()
}

/// A fresh email address that cannot collide with earlier runs.
#[must_use]
pub fn unique_email() -> String {
    format!("user-{}@test.example", Uuid::new_v4())
}

/// Register an account and return the response body.
///
/// # Panics
///
/// Panics if the request cannot be sent or the body is not JSON.
pub async fn register(client: &Client, email: &str, password: &str) -> (u16, Value) {
    let resp = client
        .post(format!("{}/users/register", base_url()))
        .json(&json!({ "email": email, "password": password, "name": "Test User" }))
        .send()
        .await
        .expect("Failed to send register request");

    let status = resp.status().as_u16();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

/// Log in and return the bearer token.
///
/// # Panics
///
/// Panics if login does not succeed.
pub async fn login(client: &Client, email: &str, password: &str) -> String {
    let resp = client
        .post(format!("{}/users/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(resp.status().as_u16(), 200, "login should succeed");

    let body: Value = resp.json().await.expect("login response is JSON");
    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_owned()
}

/// Register a fresh user and return a token for them.
pub async fn user_token(client: &Client) -> String {
    let email = unique_email();
    let (status, _) = register(client, &email, "user-password-1").await;
    assert_eq!(status, 201, "registration should succeed");
    login(client, &email, "user-password-1").await
}

/// Log in as the provisioned admin and return a token.
///
/// Requires `mu-cli admin create` to have been run (see crate docs).
pub async fn admin_token(client: &Client) -> String {
    let email = std::env::var("SHOP_TEST_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@example.com".to_owned());
    let password = std::env::var("SHOP_TEST_ADMIN_PASSWORD")
        .unwrap_or_else(|_| "admin-password-1".to_owned());
    login(client, &email, &password).await
}

/// Create a product as admin and return its JSON representation.
///
/// # Panics
///
/// Panics if creation does not return 201.
pub async fn create_product(
    client: &Client,
    admin_token: &str,
    name: &str,
    price: i64,
    stock: i32,
) -> Value {
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(admin_token)
        .json(&json!({ "name": name, "price": price, "stock": stock }))
        .send()
        .await
        .expect("Failed to send create product request");

    assert_eq!(resp.status().as_u16(), 201, "product creation should succeed");
    resp.json().await.expect("product response is JSON")
}
