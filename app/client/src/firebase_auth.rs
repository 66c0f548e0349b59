//! Identity toolkit REST provider.
//!
//! - `POST {base}/accounts:signUp?key=...`
//! - `POST {base}/accounts:signInWithPassword?key=...`
//! - `POST {base}/accounts:sendOobCode?key=...` with `requestType = PASSWORD_RESET`
//!
//! Failures come back as `{"error": {"message": "CODE : detail"}}`.
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{error::ProviderError, identity::IdentityProvider, session::Session};

pub struct FirebaseAuth {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    id_token: String,
    email: Option<String>,
    display_name: Option<String>,
    profile_picture: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAuth {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn post<B, T>(&self, method: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/accounts:{method}", self.base_url);
        debug!("POST {url}");

        let res = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(body)
            .send()
            .await?;

        read(res).await
    }

    async fn password_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ProviderError> {
        let account: AccountResponse = self
            .post(
                method,
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        Ok(into_session(account))
    }
}

async fn read<T: DeserializeOwned>(res: Response) -> Result<T, ProviderError> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        return Err(parse_error(&text));
    }

    serde_json::from_str(&text).map_err(|e| ProviderError::new("MALFORMED_RESPONSE", e.to_string()))
}

pub(crate) fn parse_error(text: &str) -> ProviderError {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => {
            let message = envelope.error.message;
            let code = message
                .split(':')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();

            ProviderError { code, message }
        }
        Err(_) => ProviderError::new("UNKNOWN", text),
    }
}

fn into_session(account: AccountResponse) -> Session {
    let lifetime = account
        .expires_in
        .as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(3600);

    let mut session =
        Session::new(account.local_id, account.email, account.id_token).with_lifetime(lifetime);
    session.profile.display_name = account.display_name.filter(|name| !name.is_empty());
    session.profile.photo_url = account.profile_picture;
    session.refresh_token = account.refresh_token;
    session
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let _: serde_json::Value = self
            .post(
                "sendOobCode",
                &OobRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                },
            )
            .await?;

        Ok(())
    }
}
