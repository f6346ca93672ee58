//! Account registration and login handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::PublicUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Build the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Display name; defaults to "User" when omitted.
    pub name: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the bearer token plus public user fields.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Register a new account.
///
/// Always creates a `user`-role account; admin provisioning goes through
/// the CLI only.
///
/// # Errors
///
/// Returns 409 if the email is already registered and 400 for invalid
/// email or password input.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth
        .register(
            &body.email,
            &body.password,
            body.name.as_deref().unwrap_or("User"),
        )
        .await?;

    tracing::info!(user_id = %user.id, "account registered");

    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

/// Verify credentials and issue a bearer token.
///
/// # Errors
///
/// Returns 401 for a wrong password or unknown email - the response shape
/// is identical in both cases.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (token, user) = auth.login(&body.email, &body.password).await?;

    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(LoginResponse {
        token,
        user: PublicUser::from(user),
    }))
}
