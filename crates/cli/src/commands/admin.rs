//! Admin account provisioning command.
//!
//! This is the privileged path that assigns the admin role; public
//! registration always creates regular users.
//!
//! # Usage
//!
//! ```bash
//! mu-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use sqlx::PgPool;
use thiserror::Error;

use mu_shop_api::db::{RepositoryError, UserRepository};
use mu_shop_api::services::auth::hash_password;
use mu_shop_core::{Email, EmailError, Role};

/// Errors that can occur during admin provisioning.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too short.
    #[error("Password must be at least 8 characters")]
    WeakPassword,

    /// Account already exists.
    #[error("Account already exists with email: {0}")]
    UserExists(String),

    /// Password hashing failed.
    #[error("Password hashing failed")]
    Hash,
}

/// Create a new admin account.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
/// * `password` - Admin's password (hashed before storage)
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns `AdminError::UserExists` if an account with the email already
/// exists, and `AdminError` variants for validation or storage failures.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email)?;

    if password.len() < 8 {
        return Err(AdminError::WeakPassword);
    }

    let password_hash = hash_password(password).map_err(|_| AdminError::Hash)?;

    let database_url =
        super::database_url().ok_or(AdminError::MissingEnvVar("SHOP_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let users = UserRepository::new(&pool);
    let user = users
        .create(&email, name, &password_hash, Role::Admin)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!("Created admin account {} ({})", user.id, user.email);
    Ok(user.id.as_i32())
}
