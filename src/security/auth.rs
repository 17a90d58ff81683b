use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";
pub const DEV_JWT_SECRET_KEY: &str = "jwt-secret-key-change-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub secret_key: String,
    pub jwt_secret_key: String,
    pub jwt_expiry_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: std::env::var("SECRET_KEY").unwrap_or_else(|_| DEV_SECRET_KEY.to_string()),
            jwt_secret_key: std::env::var("JWT_SECRET_KEY")
                .unwrap_or_else(|_| DEV_JWT_SECRET_KEY.to_string()),
            jwt_expiry_secs: 24 * 3600,
        }
    }
}

impl SecurityConfig {
    /// True when either secret is still the development placeholder
    pub fn uses_dev_secrets(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY || self.jwt_secret_key == DEV_JWT_SECRET_KEY
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JwtClaims {
    sub: String,
    exp: usize,
    iat: usize,
    #[serde(flatten)]
    extra: HashMap<String, String>,
}

/// HS256 access tokens
#[derive(Clone)]
pub struct JwtVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_secs: u64,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("expiry_secs", &self.expiry_secs)
            .finish_non_exhaustive()
    }
}

impl JwtVerifier {
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(&config.jwt_secret_key, config.jwt_expiry_secs)
    }

    pub fn expiry_secs(&self) -> u64 {
        self.expiry_secs
    }

    /// Issue a token for `subject` carrying extra string claims
    pub fn create_token(&self, subject: &str, claims: HashMap<String, String>) -> Result<String, String> {
        let now = Utc::now().timestamp() as usize;
        let jwt_claims = JwtClaims {
            sub: subject.to_string(),
            exp: now + self.expiry_secs as usize,
            iat: now,
            extra: claims,
        };
        encode(&Header::default(), &jwt_claims, &self.encoding)
            .map_err(|e| format!("Failed to create token: {}", e))
    }

    /// Verify signature and expiry; returns the claims including `sub`
    pub fn verify_token(&self, token: &str) -> Result<HashMap<String, String>, String> {
        let token_data = decode::<JwtClaims>(token, &self.decoding, &Validation::default())
            .map_err(|e| format!("Failed to verify token: {}", e))?;

        let mut result = token_data.claims.extra;
        result.insert("sub".to_string(), token_data.claims.sub);
        Ok(result)
    }
}
