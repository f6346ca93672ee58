//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use mu_shop_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::user::PublicUser;

/// An order header (domain type).
///
/// Immutable once created; `total_price` is computed from the line-item
/// snapshots at placement time and never recomputed afterwards.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user.
    pub user_id: UserId,
    /// Sum of `unit_price * quantity` across the line items.
    pub total_price: Decimal,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// A line item with price and name snapshotted at order time.
///
/// `product_id` is a plain reference without a foreign key; the product may
/// have been deleted since, and the snapshots keep the order displayable.
#[derive(Debug, Clone)]
pub struct OrderItem {
    /// Unique line-item ID.
    pub id: OrderItemId,
    /// Owning order.
    pub order_id: OrderId,
    /// The product this item referenced at order time.
    pub product_id: ProductId,
    /// Product name at order time.
    pub product_name: String,
    /// Product price at order time.
    pub unit_price: Decimal,
    /// Units ordered. Always positive.
    pub quantity: i32,
}

/// An order together with its line items.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// An order with its items and the owner's public identity.
///
/// Returned by the admin-wide listing so historical orders stay
/// attributable without another lookup.
#[derive(Debug, Clone)]
pub struct OrderWithUser {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub user: PublicUser,
}

/// One client-submitted cart entry.
///
/// Deliberately has no price field: the order service looks prices up from
/// the catalog and there is nothing for an untrusted client to override.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CartItem {
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    pub quantity: i32,
}
