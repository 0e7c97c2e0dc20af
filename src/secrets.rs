use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use log::debug;
use serde::Deserialize;

use crate::auth::Token;
use crate::error::{NotifierError, Result};

/// Source of secret strings, looked up by name.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `CredentialUnavailable` when the secret cannot be read.
    async fn secret_string(&self, name: &str) -> Result<String>;
}

/// Secret store backed by AWS Secrets Manager.
#[derive(Clone)]
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn secret_string(&self, name: &str) -> Result<String> {
        debug!("Reading secret {name}");

        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| NotifierError::CredentialUnavailable(DisplayErrorContext(&e).to_string()))?;

        output
            .secret_string()
            .map(ToOwned::to_owned)
            .ok_or_else(|| {
                NotifierError::CredentialUnavailable(format!("secret {name} has no string value"))
            })
    }
}

#[derive(Deserialize)]
struct TokenSecret {
    token: String,
}

/// Fetches the GitHub token stored as `{"token": "..."}` under `secret_name`.
///
/// # Errors
///
/// Returns `CredentialUnavailable` if the lookup fails or the secret is not a
/// JSON object with a non-empty `token` field.
pub async fn resolve_token(store: &dyn SecretStore, secret_name: &str) -> Result<Token> {
    let raw = store.secret_string(secret_name).await?;

    let secret: TokenSecret = serde_json::from_str(&raw).map_err(|e| {
        NotifierError::CredentialUnavailable(format!("secret {secret_name} is malformed: {e}"))
    })?;

    if secret.token.is_empty() {
        return Err(NotifierError::CredentialUnavailable(format!(
            "secret {secret_name} has an empty token"
        )));
    }

    Ok(Token::from(secret.token))
}
