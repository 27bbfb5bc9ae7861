use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

impl JwksCache {
    fn fresh_key(&self, kid: &str, ttl: Duration) -> Option<DecodingKey> {
        if self.fetched_at.elapsed() < ttl {
            self.keys.get(kid).cloned()
        } else {
            None
        }
    }
}

/// RSA signing keys of the token issuer, cached for `cache_ttl`
pub struct JwksClient {
    jwks_url: String,
    client: reqwest::Client,
    cache: RwLock<Option<JwksCache>>,
    cache_ttl: Duration,
}

impl JwksClient {
    pub fn new(jwks_url: &str, cache_ttl: Duration) -> Self {
        Self {
            jwks_url: jwks_url.to_string(),
            client: reqwest::Client::new(),
            cache: RwLock::new(None),
            cache_ttl,
        }
    }

    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if let Some(key) = cached.fresh_key(kid, self.cache_ttl) {
                return Ok(key);
            }
        }

        // Cache miss, expired, or key rotated
        let keys = self.fetch_jwks().await?;
        let key = keys.get(kid).cloned();

        *self.cache.write().await = Some(JwksCache {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    async fn fetch_jwks(&self) -> Result<HashMap<String, DecodingKey>, JwksError> {
        debug!("Fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::FetchError(format!(
                "Failed to fetch JWKS: HTTP {}",
                response.status()
            )));
        }

        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| JwksError::ParseError(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            match (jwk.kty.as_str(), jwk.n, jwk.e) {
                ("RSA", Some(n), Some(e)) => {
                    let decoding_key = DecodingKey::from_rsa_components(&n, &e)
                        .map_err(|e| JwksError::KeyConversionError(e.to_string()))?;
                    keys.insert(jwk.kid, decoding_key);
                }
                (kty, _, _) => warn!("Ignoring JWKS key '{}' of type {}", jwk.kid, kty),
            }
        }

        Ok(keys)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Failed to fetch JWKS: {0}")]
    FetchError(String),

    #[error("Failed to parse JWKS: {0}")]
    ParseError(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to convert key: {0}")]
    KeyConversionError(String),
}
