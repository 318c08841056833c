//! Bearer token validation

use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::config::AuthConfig;

use super::models::{AuthError, AuthUser};
use super::password::token_digest;

#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    token_id: i32,
    expires_at: chrono::DateTime<chrono::Utc>,
    #[sqlx(flatten)]
    user: AuthUser,
}

/// Resolve a bearer token to its user
///
/// Expired tokens are deleted on sight. Tokens presented inside the
/// renewal window get their expiry pushed out by a full TTL, so active
/// sessions stay alive without re-authenticating.
#[tracing::instrument(skip(pool, config, token))]
pub async fn validate_token(
    pool: &PgPool,
    config: &AuthConfig,
    token: &str,
) -> Result<AuthUser, AuthError> {
    let digest = token_digest(token);

    let row = sqlx::query_as::<_, TokenRow>(
        r#"
        SELECT t.id AS token_id, t.expires_at,
               u.id, u.ident, u.username, u.auth_type,
               u.first_name, u.last_name, u.email
        FROM user_tokens t
        JOIN users u ON u.id = t.user_id AND u.deleted_at IS NULL
        WHERE t.token_digest = $1
        "#,
    )
    .bind(&digest)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthError::TokenInvalid)?;

    let now = Utc::now();
    if row.expires_at <= now {
        sqlx::query("DELETE FROM user_tokens WHERE id = $1")
            .bind(row.token_id)
            .execute(pool)
            .await?;
        return Err(AuthError::TokenExpired);
    }

    let renewal_window = Duration::seconds(config.renewal_window_secs);
    if row.expires_at - now <= renewal_window {
        let new_expiry = now + Duration::seconds(config.token_ttl_secs);
        sqlx::query("UPDATE user_tokens SET expires_at = $1 WHERE id = $2")
            .bind(new_expiry)
            .bind(row.token_id)
            .execute(pool)
            .await?;
        tracing::debug!("Extended token for user {}", row.user.id);
    }

    Ok(row.user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            token_ttl_secs: 3600,
            renewal_window_secs: 600,
            bcgsc_url: None,
        }
    }

    async fn seed_user(pool: &PgPool) -> i32 {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO users (username, auth_type) VALUES ('analyst', 'local') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn seed_token(pool: &PgPool, user_id: i32, expires_in_secs: i64) -> String {
        let token = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO user_tokens (user_id, token_digest, expires_at) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(token_digest(&token))
            .bind(Utc::now() + Duration::seconds(expires_in_secs))
            .execute(pool)
            .await
            .unwrap();
        token
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_valid_token_resolves_user(pool: PgPool) {
        let user_id = seed_user(&pool).await;
        let token = seed_token(&pool, user_id, 3000).await;

        let user = validate_token(&pool, &test_auth_config(), &token)
            .await
            .unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.username, "analyst");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_expired_token_is_rejected_and_pruned(pool: PgPool) {
        let user_id = seed_user(&pool).await;
        let token = seed_token(&pool, user_id, -10).await;

        let result = validate_token(&pool, &test_auth_config(), &token).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));

        let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_tokens")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_token_inside_renewal_window_is_extended(pool: PgPool) {
        let user_id = seed_user(&pool).await;
        let token = seed_token(&pool, user_id, 120).await;

        validate_token(&pool, &test_auth_config(), &token)
            .await
            .unwrap();

        let expires_at = sqlx::query_scalar::<_, chrono::DateTime<Utc>>(
            "SELECT expires_at FROM user_tokens WHERE token_digest = $1",
        )
        .bind(token_digest(&token))
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(expires_at > Utc::now() + Duration::seconds(3000));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_unknown_token_is_rejected(pool: PgPool) {
        let result = validate_token(&pool, &test_auth_config(), "garbage").await;
        assert!(matches!(result, Err(AuthError::TokenInvalid)));
    }
}
