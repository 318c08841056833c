//! External BCGSC authentication client
//!
//! Accounts with `auth_type = 'bcgsc'` hold no local credential; their
//! password is checked against the institutional authentication service.

use std::time::Duration;

use serde::Serialize;

use super::models::AuthError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct CredentialCheck<'a> {
    username: &'a str,
    password: &'a str,
}

/// Client for the BCGSC authentication service
#[derive(Debug, Clone)]
pub struct BcgscClient {
    base_url: String,
    client: reqwest::Client,
}

impl BcgscClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Check a username/password pair against the external service
    ///
    /// A 2xx response means the credentials are valid; 401/403 means they
    /// are not. Any other status is treated as a service failure.
    #[tracing::instrument(skip(self, password))]
    pub async fn check_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, AuthError> {
        let url = format!("{}/session", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&CredentialCheck { username, password })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Ok(false);
        }

        tracing::error!("Unexpected status {} from authentication service", status);
        match response.error_for_status() {
            Ok(_) => Ok(false),
            Err(e) => Err(AuthError::ExternalService(e)),
        }
    }
}
