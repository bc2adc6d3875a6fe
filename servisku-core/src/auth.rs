//! Credential handling: bcrypt password hashing and HS256 bearer tokens.
//!
//! Tokens carry the user id, username, and role; expiry is validated on
//! every decode. Roles are exact strings with no hierarchy: an `admin`
//! token does not satisfy a `pegawai` gate and vice versa.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PEGAWAI: &str = "pegawai";

/// Token lifetime in hours
pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims carried by every bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (user.id_user)
    pub sub: i64,
    pub username: String,
    /// Role: admin or pegawai
    pub role: String,
    /// Expiry as unix timestamp
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            sub: user_id,
            username: username.into(),
            role: role.into(),
            exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }
}

/// HS256 key pair derived from the configured secret
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign claims into a compact token string
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        Ok(encode(&Header::default(), claims, &self.encoding)?)
    }

    /// Decode and validate a token, checking signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

/// Hash a plaintext password with bcrypt at the default cost
pub fn hash_password(plain: &str) -> Result<String> {
    Ok(bcrypt::hash(plain, bcrypt::DEFAULT_COST)?)
}

/// Check a plaintext password against a stored bcrypt hash
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool> {
    Ok(bcrypt::verify(plain, hashed)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("rahasia123").unwrap();
        assert!(verify_password("rahasia123", &hash).unwrap());
        assert!(!verify_password("salah", &hash).unwrap());
    }

    #[test]
    fn test_token_roundtrip() {
        let keys = AuthKeys::new(b"test-secret");
        let claims = Claims::new(7, "budi", ROLE_PEGAWAI);
        let token = keys.sign(&claims).unwrap();

        let decoded = keys.verify(&token).unwrap();
        assert_eq!(decoded.sub, 7);
        assert_eq!(decoded.username, "budi");
        assert_eq!(decoded.role, ROLE_PEGAWAI);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let keys = AuthKeys::new(b"test-secret");
        let other = AuthKeys::new(b"other-secret");
        let token = keys.sign(&Claims::new(1, "admin", ROLE_ADMIN)).unwrap();

        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = AuthKeys::new(b"test-secret");
        let claims = Claims {
            sub: 1,
            username: "admin".to_string(),
            role: ROLE_ADMIN.to_string(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = keys.sign(&claims).unwrap();

        assert!(keys.verify(&token).is_err());
    }
}
