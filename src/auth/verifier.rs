use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::fs;
use tracing::{debug, warn};

use super::{AuthError, AuthUser};
use crate::config::{non_empty, AuthConfig, JwtAlgorithm};

/// Token verification oracle: turns a bearer token into a stable user id.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: Option<String>,
    user_id: Option<String>,
}

/// Verifies signed ID tokens (HS256 shared secret or RS256 public key).
pub struct JwtVerifier {
    key: Option<(DecodingKey, Validation)>,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> anyhow::Result<Self> {
        let (algorithm, decoding_key) = match config.algorithm {
            JwtAlgorithm::HS256 => (
                Algorithm::HS256,
                non_empty(&config.secret).map(|s| DecodingKey::from_secret(s.as_bytes())),
            ),
            JwtAlgorithm::RS256 => {
                let key = match non_empty(&config.public_key_path) {
                    Some(path) => {
                        let pem = fs::read(path)?;
                        Some(DecodingKey::from_rsa_pem(&pem)?)
                    }
                    None => None,
                };
                (Algorithm::RS256, key)
            }
        };

        let Some(decoding_key) = decoding_key else {
            warn!("No token verification key configured; every caller will be unauthenticated");
            return Ok(Self { key: None });
        };

        let mut validation = Validation::new(algorithm);
        if let Some(issuer) = non_empty(&config.issuer) {
            validation.set_issuer(&[issuer]);
        }
        match non_empty(&config.audience) {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key: Some((decoding_key, validation)),
        })
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let (decoding_key, validation) = self.key.as_ref().ok_or(AuthError::NotConfigured)?;

        let claims = decode::<IdTokenClaims>(token, decoding_key, validation)?.claims;
        let uid = claims
            .sub
            .or(claims.user_id)
            .filter(|uid| !uid.trim().is_empty())
            .ok_or(AuthError::MissingSubject)?;

        debug!(uid = %uid, "Verified ID token");
        Ok(AuthUser { uid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "unit-test-secret";

    fn hs256_config() -> AuthConfig {
        AuthConfig {
            algorithm: JwtAlgorithm::HS256,
            secret: Some(SECRET.to_string()),
            ..AuthConfig::default()
        }
    }

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> u64 {
        4_102_444_800
    }

    #[test]
    fn accepts_valid_token_and_reads_sub() {
        let verifier = JwtVerifier::new(&hs256_config()).unwrap();
        let user = verifier
            .verify(&token(json!({"sub": "alice", "exp": far_future()}), SECRET))
            .unwrap();
        assert_eq!(user.uid, "alice");
    }

    #[test]
    fn falls_back_to_user_id_claim() {
        let verifier = JwtVerifier::new(&hs256_config()).unwrap();
        let user = verifier
            .verify(&token(json!({"user_id": "bob", "exp": far_future()}), SECRET))
            .unwrap();
        assert_eq!(user.uid, "bob");
    }

    #[test]
    fn rejects_wrong_signature() {
        let verifier = JwtVerifier::new(&hs256_config()).unwrap();
        let err = verifier
            .verify(&token(json!({"sub": "alice", "exp": far_future()}), "other"))
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn rejects_token_without_subject() {
        let verifier = JwtVerifier::new(&hs256_config()).unwrap();
        let err = verifier
            .verify(&token(json!({"exp": far_future()}), SECRET))
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingSubject));
    }

    #[test]
    fn enforces_issuer_when_configured() {
        let config = AuthConfig {
            issuer: Some("https://securetoken.google.com/demo".to_string()),
            ..hs256_config()
        };
        let verifier = JwtVerifier::new(&config).unwrap();
        let wrong = token(json!({"sub": "a", "iss": "someone-else", "exp": far_future()}), SECRET);
        assert!(verifier.verify(&wrong).is_err());

        let right = token(
            json!({"sub": "a", "iss": "https://securetoken.google.com/demo", "exp": far_future()}),
            SECRET,
        );
        assert_eq!(verifier.verify(&right).unwrap().uid, "a");
    }

    #[test]
    fn unconfigured_verifier_rejects_everything() {
        let verifier = JwtVerifier::new(&AuthConfig::default()).unwrap();
        let err = verifier
            .verify(&token(json!({"sub": "alice", "exp": far_future()}), SECRET))
            .unwrap_err();
        assert!(matches!(err, AuthError::NotConfigured));
    }
}
