//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use mu_shop_core::ProductId;

/// A catalog product (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current price. Orders snapshot this at placement time.
    pub price: Decimal,
    /// Units available for sale.
    pub stock: i32,
    /// Opaque stored image reference, if an image was ever attached.
    pub image_ref: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
///
/// Validated before it reaches the repository: `price` and `stock` are
/// checked non-negative by the catalog service.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub image_ref: Option<String>,
}

/// Partial update to a product.
///
/// `None` fields are left untouched. The image reference is three-state:
/// `image_ref` is only applied when `Some` - callers that omit the image
/// keep whatever reference was stored before.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub image_ref: Option<String>,
}

impl ProductPatch {
    /// Whether this patch changes anything at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.image_ref.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_is_empty() {
        assert!(ProductPatch::default().is_empty());

        let patch = ProductPatch {
            price: Some(Decimal::new(100, 0)),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
