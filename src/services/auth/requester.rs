use crate::error::AppError;
use crate::services::auth::Identity;
use crate::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/**
 * The optional identity behind a request.
 * Token comes from `Authorization: Bearer <token>` or `?token=<token>`;
 * no token or an unknown one means anonymous, never a rejection.
 */
pub struct Requester(pub Option<Identity>);

fn token_from_parts(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    bearer.or_else(|| {
        parts.uri.query().and_then(|query| {
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("token="))
                .map(str::to_string)
        })
    })
}

impl FromRequestParts<AppState> for Requester {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match token_from_parts(parts) {
            Some(token) if !token.is_empty() => {
                Ok(Requester(state.sessions.resolve(&token).await?))
            }
            _ => Ok(Requester(None)),
        }
    }
}
