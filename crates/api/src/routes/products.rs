//! Product catalog handlers.
//!
//! Listing is public. Create, update, and delete all pass through the
//! [`AdminUser`] gate; no handler re-implements its own role check.

use axum::{
    Json, Router,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    routing::{get, put},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use mu_shop_core::ProductId;

use crate::error::{AppError, Result};
use crate::middleware::AdminUser;
use crate::models::Product;
use crate::services::CatalogService;
use crate::services::catalog::{CreateProductInput, UpdateProductInput};
use crate::state::AppState;
use crate::storage::{ImagePayload, resolve_url};

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
}

/// Client-visible product representation.
///
/// The stored image reference is resolved to a fetchable URL here; the
/// opaque reference never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductResponse {
    fn from_product(product: Product, base_url: &str) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            stock: product.stock,
            image_url: product
                .image_ref
                .map(|r| resolve_url(base_url, &r)),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// JSON body for create/update when no file is uploaded.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody {
    name: Option<String>,
    price: Option<Decimal>,
    stock: Option<i32>,
    image_url: Option<String>,
}

/// Product mutation payload, accepted as JSON or multipart form data.
///
/// Multipart requests carry text fields (`name`, `price`, `stock`,
/// `imageUrl`) plus an optional `image` file part; JSON requests carry the
/// same fields minus the file.
#[derive(Debug, Default)]
pub struct ProductPayload {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
    pub image: Option<ImagePayload>,
}

impl FromRequest<AppState> for ProductPayload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;
            Self::from_multipart(multipart).await
        } else {
            let Json(body): Json<ProductBody> = Json::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;

            Ok(Self {
                name: body.name,
                price: body.price,
                stock: body.stock,
                image_url: body.image_url,
                image: None,
            })
        }
    }
}

impl ProductPayload {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut payload = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?
        {
            match field.name().unwrap_or("") {
                "name" => payload.name = Some(read_text(field).await?),
                "price" => {
                    let text = read_text(field).await?;
                    let price = text
                        .parse::<Decimal>()
                        .map_err(|_| AppError::Validation(format!("invalid price: {text}")))?;
                    payload.price = Some(price);
                }
                "stock" => {
                    let text = read_text(field).await?;
                    let stock = text
                        .parse::<i32>()
                        .map_err(|_| AppError::Validation(format!("invalid stock: {text}")))?;
                    payload.stock = Some(stock);
                }
                "imageUrl" => payload.image_url = Some(read_text(field).await?),
                "image" => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_owned();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(e.to_string()))?;
                    payload.image = Some(ImagePayload {
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                // Unknown fields are ignored.
                _ => {}
            }
        }

        Ok(payload)
    }
}

/// Read a multipart text field.
async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// List all products. Public, unauthenticated.
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>> {
    let catalog = CatalogService::new(state.pool(), state.images());
    let products = catalog.list().await?;

    let base_url = &state.config().base_url;
    Ok(Json(
        products
            .into_iter()
            .map(|p| ProductResponse::from_product(p, base_url))
            .collect(),
    ))
}

/// Create a product. Admin only.
///
/// # Errors
///
/// Returns 400 when required fields are missing or out of range, 401/403
/// from the gate.
async fn create_product(
    AdminUser(_claims): AdminUser,
    State(state): State<AppState>,
    payload: ProductPayload,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let name = payload
        .name
        .ok_or_else(|| AppError::Validation("name is required".to_owned()))?;
    let price = payload
        .price
        .ok_or_else(|| AppError::Validation("price is required".to_owned()))?;
    let stock = payload
        .stock
        .ok_or_else(|| AppError::Validation("stock is required".to_owned()))?;

    let catalog = CatalogService::new(state.pool(), state.images());
    let product = catalog
        .create(CreateProductInput {
            name,
            price,
            stock,
            image_url: payload.image_url,
            image: payload.image,
        })
        .await?;

    tracing::info!(product_id = %product.id, "product created");

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::from_product(
            product,
            &state.config().base_url,
        )),
    ))
}

/// Partially update a product. Admin only.
///
/// Omitted fields - including the image - keep their stored values.
async fn update_product(
    AdminUser(_claims): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: ProductPayload,
) -> Result<Json<ProductResponse>> {
    let catalog = CatalogService::new(state.pool(), state.images());
    let product = catalog
        .update(
            ProductId::new(id),
            UpdateProductInput {
                name: payload.name,
                price: payload.price,
                stock: payload.stock,
                image_url: payload.image_url,
                image: payload.image,
            },
        )
        .await?;

    tracing::info!(product_id = %product.id, "product updated");

    Ok(Json(ProductResponse::from_product(
        product,
        &state.config().base_url,
    )))
}

/// Delete a product. Admin only.
///
/// Historical order items referencing the product keep their snapshots.
async fn delete_product(
    AdminUser(_claims): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let catalog = CatalogService::new(state.pool(), state.images());
    catalog.delete(ProductId::new(id)).await?;

    tracing::info!(product_id = id, "product deleted");

    Ok(Json(json!({ "message": "deleted" })))
}
