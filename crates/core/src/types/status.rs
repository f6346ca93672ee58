//! Order status enum.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// `Created` exists only inside the order-placement transaction; every
/// order visible outside it is `Paid`. The state machine is
/// `Created -> Paid` with no other transitions (no cancellation or
/// refund states are modeled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order row written, line items not yet committed.
    #[default]
    Created,
    /// Terminal state: order and all line items committed.
    Paid,
}
