/// Firebase Identity Toolkit provider
///
/// REST equivalents of the email/password flows:
/// - `accounts:signInWithPassword`
/// - `accounts:signUp`
/// - `accounts:update` (display name after registration)
use crate::{
    error::{AppError, AppResult},
    models::AuthenticatedUser,
    services::providers::IdentityProvider,
};
use reqwest::Client as HttpClient;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extracts `error.message` from an Identity Toolkit error body, falling back
/// to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Clone)]
pub struct FirebaseAuthClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl FirebaseAuthClient {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
        }
    }

    async fn call<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> AppResult<R> {
        let url = format!("{}/accounts:{}", self.api_url.trim_end_matches('/'), method);

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(method, status = %status, "Identity Toolkit rejected request");
            return Err(AppError::Auth(error_message(&body)));
        }

        response
            .json()
            .await
            .map_err(|e| {
                AppError::Upstream(format!("Failed to parse Firebase response: {}", e.without_url()))
            })
    }

    fn into_user(account: AccountResponse, fallback: Option<&AuthenticatedUser>) -> AppResult<AuthenticatedUser> {
        let id_token = account
            .id_token
            .or_else(|| fallback.map(|u| u.id_token.clone()))
            .ok_or_else(|| AppError::Upstream("Firebase response missing idToken".to_string()))?;

        Ok(AuthenticatedUser {
            uid: account.local_id,
            email: account
                .email
                .or_else(|| fallback.map(|u| u.email.clone()))
                .unwrap_or_default(),
            display_name: account
                .display_name
                .filter(|n| !n.is_empty())
                .or_else(|| fallback.and_then(|u| u.display_name.clone())),
            id_token,
        })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthenticatedUser> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account: AccountResponse = self.call("signInWithPassword", &request).await?;
        Self::into_user(account, None)
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<AuthenticatedUser> {
        let request = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let account: AccountResponse = self.call("signUp", &request).await?;
        Self::into_user(account, None)
    }

    async fn update_profile(
        &self,
        user: &AuthenticatedUser,
        display_name: &str,
    ) -> AppResult<AuthenticatedUser> {
        let request = UpdateProfileRequest {
            id_token: &user.id_token,
            display_name,
            return_secure_token: true,
        };
        let account: AccountResponse = self.call("update", &request).await?;
        Self::into_user(account, Some(user))
    }
}
