//! Integration tests for the product catalog and its admin gate.
//!
//! Requires a running API server, database, and a provisioned admin; see
//! the crate docs. Run with `cargo test -- --ignored`.

use mu_shop_integration_tests::{
    admin_token, base_url, client, create_product, unique_email, user_token,
};
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_listing_is_public() {
    let client = client();

    let resp = client
        .get(format!("{}/products", base_url()))
        .send()
        .await
        .expect("send request");

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.expect("json body");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_create_requires_admin() {
    let client = client();
    let body = json!({ "name": "Gate Check", "price": 10, "stock": 1 });

    // No token: 401.
    let resp = client
        .post(format!("{}/products", base_url()))
        .json(&body)
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 401);

    // User token: 403.
    let token = user_token(&client).await;
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 403);

    // Admin token: 201.
    let token = admin_token(&client).await;
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 201);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_create_validates_before_persisting() {
    let client = client();
    let token = admin_token(&client).await;

    for body in [
        json!({ "name": "Bad Price", "price": -1, "stock": 5 }),
        json!({ "name": "Bad Stock", "price": 10, "stock": -5 }),
        json!({ "name": "", "price": 10, "stock": 5 }),
        json!({ "price": 10, "stock": 5 }),
    ] {
        let resp = client
            .post(format!("{}/products", base_url()))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .expect("send request");
        assert_eq!(resp.status().as_u16(), 400, "rejected body: {body}");
    }
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_partial_update_keeps_omitted_fields() {
    let client = client();
    let token = admin_token(&client).await;

    // Create with an image URL attached.
    let name = format!("Widget {}", Uuid::new_v4());
    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(&token)
        .json(&json!({
            "name": name,
            "price": 100,
            "stock": 5,
            "imageUrl": "https://cdn.example.com/widget.png",
        }))
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = resp.json().await.expect("json body");
    let id = created["id"].as_i64().expect("product id");
    assert_eq!(created["imageUrl"], json!("https://cdn.example.com/widget.png"));

    // Update the price only; the image reference must survive.
    let resp = client
        .put(format!("{}/products/{id}", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "price": 150 }))
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.expect("json body");

    assert_eq!(updated["price"], json!("150"));
    assert_eq!(updated["name"], json!(name));
    assert_eq!(updated["stock"], json!(5));
    assert_eq!(updated["imageUrl"], json!("https://cdn.example.com/widget.png"));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_update_missing_product_is_404() {
    let client = client();
    let token = admin_token(&client).await;

    let resp = client
        .put(format!("{}/products/999999", base_url()))
        .bearer_auth(&token)
        .json(&json!({ "price": 1 }))
        .send()
        .await
        .expect("send request");

    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_delete_missing_product_is_404() {
    let client = client();
    let token = admin_token(&client).await;

    let resp = client
        .delete(format!("{}/products/999999", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("send request");

    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_delete_then_listing_no_longer_contains_product() {
    let client = client();
    let token = admin_token(&client).await;

    let name = format!("Ephemeral {}", unique_email());
    let created = create_product(&client, &token, &name, 10, 1).await;
    let id = created["id"].as_i64().expect("product id");

    let resp = client
        .delete(format!("{}/products/{id}", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 200);

    let listing: Value = client
        .get(format!("{}/products", base_url()))
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("json body");

    let still_there = listing
        .as_array()
        .expect("array body")
        .iter()
        .any(|p| p["id"].as_i64() == Some(id));
    assert!(!still_there);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_multipart_upload_resolves_to_fetchable_image() {
    let client = client();
    let token = admin_token(&client).await;

    // Minimal valid PNG header bytes; the server stores what it is given.
    let png: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let form = reqwest::multipart::Form::new()
        .text("name", format!("Pictured {}", Uuid::new_v4()))
        .text("price", "25")
        .text("stock", "3")
        .part(
            "image",
            reqwest::multipart::Part::bytes(png.to_vec())
                .file_name("product.png")
                .mime_str("image/png")
                .expect("valid mime"),
        );

    let resp = client
        .post(format!("{}/products", base_url()))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 201);

    let created: Value = resp.json().await.expect("json body");
    let image_url = created["imageUrl"].as_str().expect("image url");
    assert!(image_url.contains("/media/"));

    // The resolved URL must actually serve the bytes back.
    let fetched = client.get(image_url).send().await.expect("fetch image");
    assert_eq!(fetched.status().as_u16(), 200);
    assert_eq!(fetched.bytes().await.expect("image bytes").as_ref(), png);
}
