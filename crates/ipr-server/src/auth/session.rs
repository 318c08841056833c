//! Session creation and revocation

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AuthConfig;

use super::external::BcgscClient;
use super::models::{AuthError, SessionRequest, SessionResponse, UserRecord};
use super::password::{token_digest, verify_password};

/// Authenticate a username/password pair and mint a bearer token
#[tracing::instrument(skip(pool, config, request), fields(username = %request.username))]
pub async fn login(
    pool: &PgPool,
    config: &AuthConfig,
    request: SessionRequest,
) -> Result<SessionResponse, AuthError> {
    let user = sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT id, ident, username, auth_type, password_hash,
               first_name, last_name, email
        FROM users
        WHERE username = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(&request.username)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthError::InvalidCredentials)?;

    let valid = match user.auth_type.as_str() {
        "local" => match user.password_hash.as_deref() {
            Some(hash) => verify_password(&request.password, hash)?,
            None => false,
        },
        "bcgsc" => {
            let base_url = config
                .bcgsc_url
                .as_deref()
                .ok_or(AuthError::ExternalAuthNotConfigured)?;
            BcgscClient::new(base_url)
                .check_credentials(&request.username, &request.password)
                .await?
        },
        other => {
            tracing::warn!("Unknown auth_type {:?} for user {}", other, user.id);
            false
        },
    };

    if !valid {
        return Err(AuthError::InvalidCredentials);
    }

    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::seconds(config.token_ttl_secs);

    sqlx::query(
        r#"
        INSERT INTO user_tokens (user_id, token_digest, expires_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user.id)
    .bind(token_digest(&token))
    .bind(expires_at)
    .execute(pool)
    .await?;

    tracing::info!("User {} logged in", user.username);

    Ok(SessionResponse {
        token,
        expires_at,
        user: user.into(),
    })
}

/// Revoke the token presented for this session
#[tracing::instrument(skip(pool, token))]
pub async fn logout(pool: &PgPool, token: &str) -> Result<(), AuthError> {
    let result = sqlx::query("DELETE FROM user_tokens WHERE token_digest = $1")
        .bind(token_digest(token))
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AuthError::TokenInvalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::auth::token::validate_token;

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            token_ttl_secs: 3600,
            renewal_window_secs: 600,
            bcgsc_url: None,
        }
    }

    async fn seed_local_user(pool: &PgPool, username: &str, password: &str) -> i32 {
        let hash = hash_password(password).unwrap();
        sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (username, auth_type, password_hash)
            VALUES ($1, 'local', $2)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(hash)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_login_mints_usable_token(pool: PgPool) {
        let user_id = seed_local_user(&pool, "analyst", "s3cret").await;

        let session = login(
            &pool,
            &test_auth_config(),
            SessionRequest {
                username: "analyst".to_string(),
                password: "s3cret".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(session.user.id, user_id);
        assert!(session.expires_at > Utc::now());

        let validated = validate_token(&pool, &test_auth_config(), &session.token)
            .await
            .unwrap();
        assert_eq!(validated.id, user_id);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_login_rejects_wrong_password(pool: PgPool) {
        seed_local_user(&pool, "analyst", "s3cret").await;

        let result = login(
            &pool,
            &test_auth_config(),
            SessionRequest {
                username: "analyst".to_string(),
                password: "wrong".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_login_rejects_unknown_user(pool: PgPool) {
        let result = login(
            &pool,
            &test_auth_config(),
            SessionRequest {
                username: "nobody".to_string(),
                password: "pw".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_logout_revokes_token(pool: PgPool) {
        seed_local_user(&pool, "analyst", "s3cret").await;

        let session = login(
            &pool,
            &test_auth_config(),
            SessionRequest {
                username: "analyst".to_string(),
                password: "s3cret".to_string(),
            },
        )
        .await
        .unwrap();

        logout(&pool, &session.token).await.unwrap();

        let result = validate_token(&pool, &test_auth_config(), &session.token).await;
        assert!(matches!(result, Err(AuthError::TokenInvalid)));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_logout_of_unknown_token_fails(pool: PgPool) {
        let result = logout(&pool, "not-a-token").await;
        assert!(matches!(result, Err(AuthError::TokenInvalid)));
    }
}
