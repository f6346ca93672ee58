//! Order service.
//!
//! Thin validation layer over the transactional order repository: the cart
//! shape is checked here, before any persistence is attempted, and the
//! price/stock work happens under row locks inside the repository.

use sqlx::PgPool;
use thiserror::Error;

use mu_shop_core::UserId;

use crate::db::{OrderRepository, RepositoryError};
use crate::models::{CartItem, OrderWithItems, OrderWithUser};

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The submitted cart failed validation; nothing was persisted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced product no longer exists.
    #[error("product not found")]
    ProductNotFound,

    /// Requested quantity exceeds available stock.
    #[error("{0}")]
    InsufficientStock(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order from a client-submitted cart.
    ///
    /// The cart only names products and quantities; every price comes from
    /// the catalog inside the placement transaction.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for an empty cart or non-positive
    /// quantity, `OrderError::ProductNotFound` if a referenced product is
    /// gone, and `OrderError::InsufficientStock` when stock cannot cover
    /// the requested quantity.
    pub async fn create(
        &self,
        user_id: UserId,
        cart: &[CartItem],
    ) -> Result<OrderWithItems, OrderError> {
        validate_cart(cart)?;

        self.orders.create(user_id, cart).await.map_err(|e| match e {
            RepositoryError::NotFound => OrderError::ProductNotFound,
            RepositoryError::Conflict(msg) => OrderError::InsufficientStock(msg),
            other => OrderError::Repository(other),
        })
    }

    /// List the calling user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderWithItems>, OrderError> {
        self.orders
            .list_for_user(user_id)
            .await
            .map_err(OrderError::Repository)
    }

    /// List every order with its owning user, newest first.
    ///
    /// Total revenue is a read-side fold over `total_price` in the caller;
    /// nothing aggregate is stored.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<OrderWithUser>, OrderError> {
        self.orders.list_all().await.map_err(OrderError::Repository)
    }
}

/// Check cart shape: non-empty, all quantities positive.
fn validate_cart(cart: &[CartItem]) -> Result<(), OrderError> {
    if cart.is_empty() {
        return Err(OrderError::Validation("cart must not be empty".to_owned()));
    }

    for item in cart {
        if item.quantity <= 0 {
            return Err(OrderError::Validation(format!(
                "quantity for product {} must be positive",
                item.product_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mu_shop_core::ProductId;

    #[test]
    fn test_empty_cart_rejected() {
        assert!(matches!(
            validate_cart(&[]),
            Err(OrderError::Validation(_))
        ));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let cart = [CartItem {
            product_id: ProductId::new(1),
            quantity: 0,
        }];
        assert!(matches!(
            validate_cart(&cart),
            Err(OrderError::Validation(_))
        ));

        let cart = [CartItem {
            product_id: ProductId::new(1),
            quantity: -2,
        }];
        assert!(validate_cart(&cart).is_err());
    }

    #[test]
    fn test_valid_cart_accepted() {
        let cart = [
            CartItem {
                product_id: ProductId::new(1),
                quantity: 2,
            },
            CartItem {
                product_id: ProductId::new(2),
                quantity: 1,
            },
        ];
        assert!(validate_cart(&cart).is_ok());
    }
}
