use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;

use super::jwks::JwksClient;
use super::model::{AuthenticatedUser, CustomClaims};
use crate::core::error::AppError;

/// Validates RS256 access tokens against the issuer's JWKS
pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    validation: Validation,
}

/// Claims read from an access token; iss, aud, exp and nbf are checked by `Validation`
#[derive(Debug, Deserialize)]
struct AccessClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(rename = "https://equiptrack.app/claims", default)]
    custom_claims: Option<CustomClaims>,
}

impl From<AccessClaims> for AuthenticatedUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            sub: claims.sub,
            email: claims.email,
            roles: claims
                .custom_claims
                .map(|custom| custom.roles)
                .unwrap_or_default(),
        }
    }
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = leeway.as_secs();
        validation.validate_nbf = true;

        Self {
            jwks_client,
            validation,
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        // Reject before any JWKS lookup
        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let token_data = decode::<AccessClaims>(token, &decoding_key, &self.validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(token_data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn validator() -> JwtValidator {
        // Unroutable JWKS endpoint: these tests must fail before any lookup
        let jwks = Arc::new(JwksClient::new(
            "http://127.0.0.1:9/.well-known/jwks.json",
            Duration::from_secs(60),
        ));
        JwtValidator::new(
            jwks,
            "https://auth.example.com".to_string(),
            "equiptrack".to_string(),
            Duration::from_secs(60),
        )
    }

    fn hs256_token(kid: Option<&str>) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = kid.map(String::from);
        encode(
            &header,
            &json!({ "sub": "user-1", "exp": 4_000_000_000u64 }),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_rejects_non_rs256_tokens() {
        let err = validator()
            .validate_token(&hs256_token(Some("key-1")))
            .await
            .unwrap_err();
        match err {
            AppError::Auth(msg) => assert!(msg.contains("Only RS256")),
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejects_garbage() {
        let err = validator().validate_token("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_roles_come_from_namespaced_claims() {
        let claims: AccessClaims = serde_json::from_value(json!({
            "sub": "user-1",
            "email": "lead@example.com",
            "https://equiptrack.app/claims": { "roles": ["manager"] }
        }))
        .unwrap();

        let user = AuthenticatedUser::from(claims);
        assert_eq!(user.roles, vec!["manager".to_string()]);
        assert_eq!(user.email.as_deref(), Some("lead@example.com"));
    }
}
