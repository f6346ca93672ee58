//! Order repository: transactional order placement and listings.
//!
//! Order placement is the one multi-row write in the system. Everything -
//! stock checks, stock decrements, the order header, every line item, and
//! the flip to `paid` - happens inside a single transaction, so a failure
//! at any point leaves no partial order visible to other readers.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mu_shop_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartItem, Order, OrderItem, OrderWithItems, OrderWithUser, PublicUser};

/// Internal row type for order header queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    total_price: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total_price: row.total_price,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for line-item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

/// Internal row type for the admin listing (order joined with its owner).
#[derive(Debug, sqlx::FromRow)]
struct OrderWithUserRow {
    id: i32,
    user_id: i32,
    total_price: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    user_email: String,
    user_name: String,
    user_role: mu_shop_core::Role,
}

/// Product fields locked and read inside the order transaction.
#[derive(Debug, sqlx::FromRow)]
struct LockedProductRow {
    id: i32,
    name: String,
    price: Decimal,
    stock: i32,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order for `user_id` from the given cart.
    ///
    /// Prices and names are read from the catalog under row locks and
    /// snapshotted onto the line items; stock is checked and decremented in
    /// the same transaction. The order is inserted as `created` and flipped
    /// to `paid` once every line item is in place, so `paid` is the only
    /// status that ever escapes this function.
    ///
    /// Callers must have validated that the cart is non-empty and every
    /// quantity is positive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a referenced product does not
    /// exist, `RepositoryError::Conflict` if stock is insufficient, and
    /// `RepositoryError::Database` for storage failures. In every error
    /// case the transaction is rolled back and nothing is persisted.
    pub async fn create(
        &self,
        user_id: UserId,
        cart: &[CartItem],
    ) -> Result<OrderWithItems, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Lock referenced products in ascending ID order so concurrent
        // orders acquire row locks in the same sequence.
        let product_ids: BTreeSet<i32> = cart.iter().map(|c| c.product_id.as_i32()).collect();
        let mut products: HashMap<i32, LockedProductRow> = HashMap::new();
        for id in product_ids {
            let row = sqlx::query_as::<_, LockedProductRow>(
                r"
                SELECT id, name, price, stock
                FROM products
                WHERE id = $1
                FOR UPDATE
                ",
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

            products.insert(id, row);
        }

        // Check stock against the sum of requested quantities per product
        // and compute the authoritative total.
        let mut requested: HashMap<i32, i32> = HashMap::new();
        let mut total = Decimal::ZERO;
        for item in cart {
            let product = &products[&item.product_id.as_i32()];
            let prior = requested.get(&product.id).copied().unwrap_or(0);
            let wanted = i64::from(prior) + i64::from(item.quantity);
            if wanted > i64::from(product.stock) {
                return Err(RepositoryError::Conflict(format!(
                    "insufficient stock for product {}",
                    product.id
                )));
            }
            // wanted <= stock, so it fits in i32
            requested.insert(product.id, i32::try_from(wanted).unwrap_or(i32::MAX));
            total += product.price * Decimal::from(item.quantity);
        }

        for (product_id, quantity) in &requested {
            sqlx::query(
                r"
                UPDATE products
                SET stock = stock - $2, updated_at = now()
                WHERE id = $1
                ",
            )
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        let order_row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, total_price, status)
            VALUES ($1, $2, 'created')
            RETURNING id, user_id, total_price, status, created_at
            ",
        )
        .bind(user_id.as_i32())
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(cart.len());
        for item in cart {
            let product = &products[&item.product_id.as_i32()];
            let item_row = sqlx::query_as::<_, OrderItemRow>(
                r"
                INSERT INTO order_items (order_id, product_id, product_name, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, order_id, product_id, product_name, unit_price, quantity
                ",
            )
            .bind(order_row.id)
            .bind(product.id)
            .bind(&product.name)
            .bind(product.price)
            .bind(item.quantity)
            .fetch_one(&mut *tx)
            .await?;

            items.push(OrderItem::from(item_row));
        }

        // All rows are in place: the order is paid.
        sqlx::query(
            r"
            UPDATE orders
            SET status = 'paid'
            WHERE id = $1
            ",
        )
        .bind(order_row.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut order = Order::from(order_row);
        order.status = OrderStatus::Paid;

        Ok(OrderWithItems { order, items })
    }

    /// List a user's orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, total_price, status, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let order_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items_by_order = self.fetch_items(&order_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                OrderWithItems {
                    order: Order::from(row),
                    items,
                }
            })
            .collect())
    }

    /// List every order with its items and owning user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list_all(&self) -> Result<Vec<OrderWithUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderWithUserRow>(
            r"
            SELECT o.id, o.user_id, o.total_price, o.status, o.created_at,
                   u.email AS user_email, u.name AS user_name, u.role AS user_role
            FROM orders o
            JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let order_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items_by_order = self.fetch_items(&order_ids).await?;

        rows.into_iter()
            .map(|row| {
                let email = mu_shop_core::Email::parse(&row.user_email).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
                })?;

                let items = items_by_order.remove(&row.id).unwrap_or_default();
                Ok(OrderWithUser {
                    user: PublicUser {
                        id: UserId::new(row.user_id),
                        email,
                        name: row.user_name,
                        role: row.user_role,
                    },
                    order: Order {
                        id: OrderId::new(row.id),
                        user_id: UserId::new(row.user_id),
                        total_price: row.total_price,
                        status: row.status,
                        created_at: row.created_at,
                    },
                    items,
                })
            })
            .collect()
    }

    /// Fetch line items for a set of orders, grouped by order ID.
    async fn fetch_items(
        &self,
        order_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<OrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, order_id, product_id, product_name, unit_price, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, id
            ",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.order_id)
                .or_default()
                .push(OrderItem::from(row));
        }

        Ok(grouped)
    }
}
