//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Accounts
//! POST /users/register         - Register (public, always user role)
//! POST /users/login            - Login, returns bearer token
//!
//! # Catalog
//! GET    /products             - Product listing (public)
//! POST   /products             - Create product (admin)
//! PUT    /products/{id}        - Partial update (admin)
//! DELETE /products/{id}        - Delete product (admin)
//!
//! # Orders
//! POST /orders                 - Place order from cart (user)
//! GET  /my-orders              - Caller's orders, newest first (user)
//! GET  /admin/orders           - All orders with owners (admin)
//!
//! # Media
//! GET  /media/{file}           - Stored product images (ServeDir)
//! ```

pub mod orders;
pub mod products;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the application router (everything except health and media).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(products::router())
        .merge(orders::router())
}
