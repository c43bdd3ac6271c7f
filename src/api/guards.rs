use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::repositories;

const INVALID_CREDENTIALS: &str = "Invalid authentication credentials";

/// The caller behind a valid bearer token.
pub(crate) struct CurrentUser(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(&parts.headers).ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;
        let claims = security::verify_token(token, state.settings())
            .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS))?;

        repositories::users::find_by_id(state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized("User not found"))
    }
}

/// Token from an `Authorization: Bearer <token>` header. The scheme is matched
/// case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Only the user a teacher profile points at may edit it.
pub(crate) async fn require_profile_owner(
    state: &AppState,
    user: &User,
    profile_id: &str,
) -> Result<(), ApiError> {
    let owner = repositories::teachers::find_owner(state.db(), profile_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load teacher profile"))?;

    match owner {
        None => Err(ApiError::NotFound("Teacher not found".to_string())),
        Some(owner) if owner == user.id => Ok(()),
        Some(_) => Err(ApiError::Forbidden("Only the profile owner may edit it")),
    }
}
