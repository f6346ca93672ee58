//! Product catalog service.
//!
//! Validates input before anything touches the database, and owns the
//! hand-off to the image storage collaborator. Read access is public;
//! the mutating entry points are only reachable through the admin gate.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use mu_shop_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::models::{NewProduct, Product, ProductPatch};
use crate::storage::{ImagePayload, ImageStore, StorageError};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input failed validation; nothing was persisted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No product with the requested ID.
    #[error("product not found")]
    NotFound,

    /// Image storage failure.
    #[error("image storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Fields accepted when creating a product.
#[derive(Debug)]
pub struct CreateProductInput {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    /// Client-supplied absolute image URL, stored as-is.
    pub image_url: Option<String>,
    /// Uploaded image file; stored and replaced by its reference.
    pub image: Option<ImagePayload>,
}

/// Fields accepted when updating a product. All optional.
#[derive(Debug, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
    pub image: Option<ImagePayload>,
}

/// Product catalog service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    images: &'a ImageStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, images: &'a ImageStore) -> Self {
        Self {
            products: ProductRepository::new(pool),
            images,
        }
    }

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list().await?)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` on a blank name, negative price,
    /// or negative stock. Returns `CatalogError::Storage` if a supplied
    /// image payload cannot be persisted.
    pub async fn create(&self, input: CreateProductInput) -> Result<Product, CatalogError> {
        validate_name(&input.name)?;
        validate_price(input.price)?;
        validate_stock(input.stock)?;

        let image_ref = match input.image {
            Some(payload) => Some(self.images.save(&payload).await?),
            None => input.image_url,
        };

        let product = self
            .products
            .create(&NewProduct {
                name: input.name,
                price: input.price,
                stock: input.stock,
                image_ref,
            })
            .await?;

        Ok(product)
    }

    /// Apply a partial update.
    ///
    /// Omitted fields - including the image - are left untouched; a new
    /// image payload replaces the prior reference outright.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist, and
    /// `CatalogError::Validation` for out-of-range supplied fields.
    pub async fn update(
        &self,
        id: ProductId,
        input: UpdateProductInput,
    ) -> Result<Product, CatalogError> {
        if let Some(name) = &input.name {
            validate_name(name)?;
        }
        if let Some(price) = input.price {
            validate_price(price)?;
        }
        if let Some(stock) = input.stock {
            validate_stock(stock)?;
        }

        let image_ref = match input.image {
            Some(payload) => Some(self.images.save(&payload).await?),
            None => input.image_url,
        };

        let patch = ProductPatch {
            name: input.name,
            price: input.price,
            stock: input.stock,
            image_ref,
        };

        self.products
            .update(id, &patch)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        if self.products.delete(id).await? {
            Ok(())
        } else {
            Err(CatalogError::NotFound)
        }
    }
}

fn validate_name(name: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation("name must not be empty".to_owned()));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), CatalogError> {
    if price < Decimal::ZERO {
        return Err(CatalogError::Validation(
            "price must not be negative".to_owned(),
        ));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<(), CatalogError> {
    if stock < 0 {
        return Err(CatalogError::Validation(
            "stock must not be negative".to_owned(),
        ));
    }
    Ok(())
}
