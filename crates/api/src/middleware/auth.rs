//! Authentication extractors - the access-control gate.
//!
//! Every mutating entry point declares one of two capability checks by
//! taking an extractor argument: [`AuthUser`] (any valid token) or
//! [`AdminUser`] (valid token with the admin role). Extraction runs
//! before handler logic, so an unauthenticated or under-privileged
//! request never reaches a service. The public catalog read path simply
//! takes neither.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::services::auth::{Claims, TokenError};
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn place_order(
///     AuthUser(claims): AuthUser,
/// ) -> Result<Json<OrderResponse>> {
///     let user_id = claims.sub;
///     // ...
/// }
/// ```
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.tokens().verify(token)?;
        Ok(Self(claims))
    }
}

/// Extractor that requires a valid bearer token with the admin role.
///
/// Rejects with an authentication error (401) when no usable token is
/// presented and an authorization error (403) when the token verifies but
/// the role claim is not admin.
pub struct AdminUser(pub Claims);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        if !claims.role.is_admin() {
            return Err(AppError::Forbidden(
                "administrator role required".to_owned(),
            ));
        }

        Ok(Self(claims))
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, TokenError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(TokenError::Missing)?;

    let value = header.to_str().map_err(|_| TokenError::Malformed)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(TokenError::Malformed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_missing_header() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), Err(TokenError::Missing));
    }

    #[test]
    fn test_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&parts), Err(TokenError::Malformed));
    }

    #[test]
    fn test_empty_token() {
        let parts = parts_with_auth(Some("Bearer "));
        assert_eq!(bearer_token(&parts), Err(TokenError::Malformed));
    }

    #[test]
    fn test_extracts_token() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Ok("abc.def.ghi"));
    }
}
