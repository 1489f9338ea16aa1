use std::borrow::Cow;
use std::time::Duration;

use jsonwebtoken::jwk::JwkSet;

use super::AuthError;

/// Where the identity provider's signing keys come from
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Fetched from the provider on every verification
    Remote {
        client: reqwest::Client,
        url: url::Url,
    },
    /// A fixed key set, for offline runs and tests
    Static(JwkSet),
}

impl KeySource {
    pub fn remote(url: url::Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(KeySource::Remote { client, url })
    }

    /// Parse a published JWKS document
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        Ok(KeySource::Static(serde_json::from_str(document)?))
    }

    pub async fn key_set(&self) -> Result<Cow<'_, JwkSet>, AuthError> {
        match self {
            KeySource::Static(set) => Ok(Cow::Borrowed(set)),
            KeySource::Remote { client, url } => {
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

                let set = response
                    .json::<JwkSet>()
                    .await
                    .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

                tracing::debug!("Fetched {} signing keys from {}", set.keys.len(), url);
                Ok(Cow::Owned(set))
            }
        }
    }
}
