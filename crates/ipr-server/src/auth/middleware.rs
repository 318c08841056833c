//! Bearer authentication middleware

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::AppState;

use super::models::AuthError;
use super::token::validate_token;

/// Extract the bearer token from an Authorization header value
pub fn bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::TokenMissing)?
        .to_str()
        .map_err(|_| AuthError::TokenInvalid)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::TokenInvalid)
}

/// Require a valid bearer token; inserts the resolved [`AuthUser`] into
/// request extensions for downstream handlers
///
/// [`AuthUser`]: super::models::AuthUser
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers())?.to_string();
    let user = validate_token(&state.db, &state.config.auth, &token).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};

    use super::*;

    #[test]
    fn test_extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc-123"),
        );
        assert_eq!(bearer_token(&headers).unwrap(), "abc-123");
    }

    #[test]
    fn test_missing_header_is_token_missing() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::TokenMissing)
        ));
    }

    #[test]
    fn test_non_bearer_scheme_is_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwdw=="),
        );
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_empty_token_is_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::TokenInvalid)
        ));
    }
}
