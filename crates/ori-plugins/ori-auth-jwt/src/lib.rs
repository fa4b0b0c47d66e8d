//! # ori-auth-jwt
//!
//! HS256 JWT implementation of `IdentityProvider`.
//! Stands in for the hosted identity provider: the token's `sub` is the
//! stable user id, `email` and `name` feed the profile sync.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ori_core::error::{AppError, Result};
use ori_core::models::Identity;
use ori_core::traits::IdentityProvider;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aud: Option<String>,
}

pub struct JwtIdentityProvider {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
    issuer: Option<String>,
    audience: Option<String>,
}

impl JwtIdentityProvider {
    /// `issuer` and `audience`, when set, are required to match on every token.
    pub fn new(secret: &SecretString, issuer: Option<String>, audience: Option<String>) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(iss) = &issuer {
            validation.set_issuer(&[iss]);
        }
        match &audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding: DecodingKey::from_secret(key),
            encoding: EncodingKey::from_secret(key),
            validation,
            issuer,
            audience,
        }
    }

    /// Signs a token for `identity`, valid for `ttl`.
    /// Used by the dev token command and by tests.
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> anyhow::Result<String> {
        let now = Utc::now();
        let expires = now.checked_add_signed(ttl).context("token lifetime out of range")?;
        let claims = Claims {
            sub: identity.uid.clone(),
            exp: expires.timestamp(),
            iat: now.timestamp(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Identity> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            debug!(error = %err, "token rejected");
            AppError::Unauthorized("invalid or expired token".into())
        })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized("token has no subject".into()));
        }

        Ok(Identity {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[tokio::test]
    async fn issued_tokens_verify() {
        let provider = JwtIdentityProvider::new(&secret("s3cret"), Some("oriana".into()), None);
        let identity = Identity {
            uid: "U1".into(),
            email: Some("u1@example.com".into()),
            name: Some("Una".into()),
        };

        let token = provider.issue(&identity, Duration::minutes(5)).unwrap();
        assert_eq!(provider.verify_token(&token).await.unwrap(), identity);
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let signer = JwtIdentityProvider::new(&secret("one"), None, None);
        let verifier = JwtIdentityProvider::new(&secret("two"), None, None);

        let token = signer.issue(&Identity::new("U1"), Duration::minutes(5)).unwrap();
        assert!(matches!(verifier.verify_token(&token).await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn expired_and_garbage_tokens_are_unauthorized() {
        let provider = JwtIdentityProvider::new(&secret("s3cret"), None, None);
        let token = provider.issue(&Identity::new("U1"), Duration::hours(-2)).unwrap();

        assert!(matches!(provider.verify_token(&token).await, Err(AppError::Unauthorized(_))));
        assert!(matches!(provider.verify_token("not.a.jwt").await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn audience_mismatch_is_unauthorized() {
        let signer = JwtIdentityProvider::new(&secret("s3cret"), None, Some("other-app".into()));
        let verifier = JwtIdentityProvider::new(&secret("s3cret"), None, Some("oriana".into()));

        let token = signer.issue(&Identity::new("U1"), Duration::minutes(5)).unwrap();
        assert!(verifier.verify_token(&token).await.is_err());
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        let provider = JwtIdentityProvider::new(&secret("s3cret"), None, None);
        assert!(provider.issue(&Identity::new("U1"), Duration::MAX).is_err());
    }
}
