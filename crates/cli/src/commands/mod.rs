//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

/// Resolve the database URL from `SHOP_DATABASE_URL`, falling back to the
/// generic `DATABASE_URL`.
pub(crate) fn database_url() -> Option<String> {
    std::env::var("SHOP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}
