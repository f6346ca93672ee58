//! Catalog seeding command.
//!
//! Inserts a small demo catalog, skipping products that already exist by
//! name so the command is safe to re-run.
//!
//! # Usage
//!
//! ```bash
//! mu-cli seed
//! ```

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

/// Demo products: name, price, stock.
const SEED_PRODUCTS: &[(&str, i64, i32)] = &[
    ("iPhone 15 Pro", 42_900, 10),
    ("MacBook Air M2", 39_900, 5),
    ("AirPods Pro", 8_900, 20),
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Seed the catalog with demo products.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = super::database_url().ok_or(SeedError::MissingEnvVar("SHOP_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let mut inserted = 0_u32;
    for (name, price, stock) in SEED_PRODUCTS {
        let result = sqlx::query(
            r"
            INSERT INTO products (name, price, stock)
            SELECT $1, $2, $3
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)
            ",
        )
        .bind(name)
        .bind(Decimal::from(*price))
        .bind(stock)
        .execute(&pool)
        .await?;

        inserted += u32::try_from(result.rows_affected()).unwrap_or(0);
    }

    tracing::info!("Seeding finished: {inserted} products inserted");
    Ok(())
}
