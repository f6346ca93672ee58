//! Order handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mu_shop_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use crate::error::Result;
use crate::middleware::{AdminUser, AuthUser};
use crate::models::{CartItem, OrderItem, OrderWithItems, OrderWithUser, PublicUser};
use crate::services::OrderService;
use crate::state::AppState;

/// Build the order router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/my-orders", get(my_orders))
        .route("/admin/orders", get(admin_orders))
}

/// Order placement request body.
///
/// Entries carry only `productId` and `quantity` - there is no price
/// field to trust or distrust.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<CartItem>,
}

/// Client-visible line item with its order-time snapshots.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}

/// Client-visible order with its items.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderWithItems> for OrderResponse {
    fn from(order: OrderWithItems) -> Self {
        Self {
            id: order.order.id,
            user_id: order.order.user_id,
            total_price: order.order.total_price,
            status: order.order.status,
            created_at: order.order.created_at,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

/// Admin listing entry: an order plus its owner's public identity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderResponse {
    pub id: OrderId,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub user: PublicUser,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderWithUser> for AdminOrderResponse {
    fn from(order: OrderWithUser) -> Self {
        Self {
            id: order.order.id,
            total_price: order.order.total_price,
            status: order.order.status,
            created_at: order.order.created_at,
            user: order.user,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

/// Place an order from the submitted cart. Requires authentication.
///
/// The total is computed from catalog prices inside the placement
/// transaction; the order and all its line items are committed atomically
/// or not at all.
async fn create_order(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let orders = OrderService::new(state.pool());
    let order = orders.create(claims.sub, &body.items).await?;

    tracing::info!(
        order_id = %order.order.id,
        user_id = %claims.sub,
        total = %order.order.total_price,
        "order placed"
    );

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// List the calling user's orders, newest first.
async fn my_orders(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = OrderService::new(state.pool());
    let orders = orders.list_for_user(claims.sub).await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// List every order with its owning user, newest first. Admin only.
///
/// Revenue reporting is a read-side fold over `totalPrice` in the caller.
async fn admin_orders(
    AdminUser(_claims): AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminOrderResponse>>> {
    let orders = OrderService::new(state.pool());
    let orders = orders.list_all().await?;

    Ok(Json(
        orders.into_iter().map(AdminOrderResponse::from).collect(),
    ))
}
