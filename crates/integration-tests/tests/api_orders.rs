//! Integration tests for order placement and listings.
//!
//! Requires a running API server, database, and a provisioned admin; see
//! the crate docs. Run with `cargo test -- --ignored`.

use mu_shop_integration_tests::{admin_token, base_url, client, create_product, user_token};
use serde_json::{Value, json};
use uuid::Uuid;

async fn get_product(client: &reqwest::Client, id: i64) -> Option<Value> {
    let listing: Value = client
        .get(format!("{}/products", base_url()))
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("json body");

    listing
        .as_array()
        .expect("array body")
        .iter()
        .find(|p| p["id"].as_i64() == Some(id))
        .cloned()
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_total_is_computed_from_catalog_prices() {
    let client = client();
    let admin = admin_token(&client).await;
    let user = user_token(&client).await;

    let product = create_product(&client, &admin, &format!("Widget {}", Uuid::new_v4()), 100, 5).await;
    let id = product["id"].as_i64().expect("product id");

    // The client-side "price" field is not part of the contract; sending
    // one anyway must not influence the total.
    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user)
        .json(&json!({
            "items": [{ "productId": id, "quantity": 2, "price": 1 }]
        }))
        .send()
        .await
        .expect("send request");

    assert_eq!(resp.status().as_u16(), 201);
    let order: Value = resp.json().await.expect("json body");

    assert_eq!(order["totalPrice"], json!("200"));
    assert_eq!(order["status"], json!("PAID"));
    assert_eq!(order["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(order["items"][0]["unitPrice"], json!("100"));
    assert_eq!(order["items"][0]["quantity"], json!(2));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_order_decrements_stock() {
    let client = client();
    let admin = admin_token(&client).await;
    let user = user_token(&client).await;

    let product = create_product(&client, &admin, &format!("Stocked {}", Uuid::new_v4()), 50, 5).await;
    let id = product["id"].as_i64().expect("product id");

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user)
        .json(&json!({ "items": [{ "productId": id, "quantity": 2 }] }))
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 201);

    let product = get_product(&client, id).await.expect("product listed");
    assert_eq!(product["stock"], json!(3));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_insufficient_stock_conflicts_and_leaves_no_trace() {
    let client = client();
    let admin = admin_token(&client).await;
    let user = user_token(&client).await;

    let product = create_product(&client, &admin, &format!("Scarce {}", Uuid::new_v4()), 10, 3).await;
    let id = product["id"].as_i64().expect("product id");

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user)
        .json(&json!({ "items": [{ "productId": id, "quantity": 4 }] }))
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 409);

    // Stock unchanged, and no partial order appeared for the user.
    let product = get_product(&client, id).await.expect("product listed");
    assert_eq!(product["stock"], json!(3));

    let orders: Value = client
        .get(format!("{}/my-orders", base_url()))
        .bearer_auth(&user)
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("json body");
    assert_eq!(orders.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_empty_cart_is_rejected() {
    let client = client();
    let user = user_token(&client).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user)
        .json(&json!({ "items": [] }))
        .send()
        .await
        .expect("send request");

    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_unknown_product_is_404() {
    let client = client();
    let user = user_token(&client).await;

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user)
        .json(&json!({ "items": [{ "productId": 999999, "quantity": 1 }] }))
        .send()
        .await
        .expect("send request");

    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_snapshots_survive_price_change_and_deletion() {
    let client = client();
    let admin = admin_token(&client).await;
    let user = user_token(&client).await;

    let name = format!("Snapshot {}", Uuid::new_v4());
    let product = create_product(&client, &admin, &name, 100, 5).await;
    let id = product["id"].as_i64().expect("product id");

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user)
        .json(&json!({ "items": [{ "productId": id, "quantity": 1 }] }))
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 201);

    // Raise the price, then delete the product entirely.
    let resp = client
        .put(format!("{}/products/{id}", base_url()))
        .bearer_auth(&admin)
        .json(&json!({ "price": 999 }))
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = client
        .delete(format!("{}/products/{id}", base_url()))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 200);

    // The historical order still shows the order-time name and price.
    let orders: Value = client
        .get(format!("{}/my-orders", base_url()))
        .bearer_auth(&user)
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("json body");

    let order = &orders.as_array().expect("array body")[0];
    assert_eq!(order["items"][0]["productName"], json!(name));
    assert_eq!(order["items"][0]["unitPrice"], json!("100"));
    assert_eq!(order["totalPrice"], json!("100"));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_my_orders_newest_first_and_scoped_to_caller() {
    let client = client();
    let admin = admin_token(&client).await;
    let user = user_token(&client).await;
    let other = user_token(&client).await;

    let product = create_product(&client, &admin, &format!("Ordered {}", Uuid::new_v4()), 10, 10).await;
    let id = product["id"].as_i64().expect("product id");

    for quantity in [1, 2] {
        let resp = client
            .post(format!("{}/orders", base_url()))
            .bearer_auth(&user)
            .json(&json!({ "items": [{ "productId": id, "quantity": quantity }] }))
            .send()
            .await
            .expect("send request");
        assert_eq!(resp.status().as_u16(), 201);
    }

    let orders: Value = client
        .get(format!("{}/my-orders", base_url()))
        .bearer_auth(&user)
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("json body");

    let orders = orders.as_array().expect("array body");
    assert_eq!(orders.len(), 2);
    // Newest first: the quantity-2 order was placed last.
    assert_eq!(orders[0]["items"][0]["quantity"], json!(2));
    assert_eq!(orders[1]["items"][0]["quantity"], json!(1));

    // The other user sees none of them.
    let other_orders: Value = client
        .get(format!("{}/my-orders", base_url()))
        .bearer_auth(&other)
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("json body");
    assert_eq!(other_orders.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_admin_listing_carries_owner_identity() {
    let client = client();
    let admin = admin_token(&client).await;
    let user = user_token(&client).await;

    let product = create_product(&client, &admin, &format!("Audited {}", Uuid::new_v4()), 10, 5).await;
    let id = product["id"].as_i64().expect("product id");

    let resp = client
        .post(format!("{}/orders", base_url()))
        .bearer_auth(&user)
        .json(&json!({ "items": [{ "productId": id, "quantity": 1 }] }))
        .send()
        .await
        .expect("send request");
    assert_eq!(resp.status().as_u16(), 201);
    let placed: Value = resp.json().await.expect("json body");
    let order_id = placed["id"].as_i64().expect("order id");

    let orders: Value = client
        .get(format!("{}/admin/orders", base_url()))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("send request")
        .json()
        .await
        .expect("json body");

    let entry = orders
        .as_array()
        .expect("array body")
        .iter()
        .find(|o| o["id"].as_i64() == Some(order_id))
        .expect("order in admin listing")
        .clone();

    assert!(entry["user"]["email"].as_str().is_some());
    assert!(entry["user"].get("password").is_none());
}
