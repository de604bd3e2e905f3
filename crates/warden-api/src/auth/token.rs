// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token issuance and verification.
//!
//! Tokens are JWTs in compact serialization signed with an HMAC algorithm.
//! Verification runs in a fixed order so callers get a precise failure kind:
//!
//! 1. three base64url segments and a JSON header (`Malformed`)
//! 2. expiry against the supplied clock when the payload decodes (`Expired`,
//!    whatever the signature)
//! 3. HMAC recomputation over `header.payload`, compared in constant time
//!    (`BadSignature`, including any payload that fails to decode)
//! 4. claims, issuer and token kind of a correctly signed token (`Malformed`)

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{crypto, encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use warden_core::{CredentialHasher, CredentialStore, PasswordError, StoreError, User};

use super::claims::{Claims, TokenKind};
use crate::config::ConfigError;

/// Minimum recommended secret length in bytes.
const RECOMMENDED_SECRET_LEN: usize = 32;

// =============================================================================
// TokenConfig
// =============================================================================

/// Token signing configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// HMAC secret.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Value of the `iss` claim.
    pub issuer: String,
    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// Signing algorithm. Only HMAC algorithms are accepted.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            issuer: "warden".to_string(),
            access_ttl_secs: 3600,          // 1 hour
            refresh_ttl_secs: 86400 * 7,    // 7 days
            algorithm: Algorithm::HS256,
        }
    }
}

impl TokenConfig {
    /// Creates a configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the access token lifetime.
    pub fn with_access_ttl(mut self, secs: i64) -> Self {
        self.access_ttl_secs = secs;
        self
    }

    /// Sets the refresh token lifetime.
    pub fn with_refresh_ttl(mut self, secs: i64) -> Self {
        self.refresh_ttl_secs = secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation("token.secret", "secret is not configured"));
        }
        if self.access_ttl_secs <= 0 {
            return Err(ConfigError::validation(
                "token.access_ttl_secs",
                "must be positive",
            ));
        }
        if self.refresh_ttl_secs <= 0 {
            return Err(ConfigError::validation(
                "token.refresh_ttl_secs",
                "must be positive",
            ));
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::validation(
                "token.algorithm",
                "only HS256, HS384 and HS512 are supported",
            ));
        }
        if self.secret.len() < RECOMMENDED_SECRET_LEN {
            warn!(
                len = self.secret.len(),
                "Token secret is shorter than recommended (32 bytes)"
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

// =============================================================================
// TokenError
// =============================================================================

/// Token service errors.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Unknown username or wrong password. Deliberately indistinguishable.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The token could not be decoded, or is of the wrong kind.
    #[error("Malformed token")]
    Malformed,

    /// The token is past its expiry.
    #[error("Token has expired")]
    Expired,

    /// The signature does not match the header and payload.
    #[error("Invalid token signature")]
    BadSignature,

    /// The credential store failed.
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Signing or hashing failed.
    #[error("Token service internal error: {0}")]
    Internal(String),
}

impl TokenError {
    /// Returns `true` for failures caused by the presented token itself.
    ///
    /// These all reach clients as the same 401.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            TokenError::Malformed | TokenError::Expired | TokenError::BadSignature
        )
    }

    /// Returns the error kind as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            TokenError::InvalidCredentials => "invalid_credentials",
            TokenError::Malformed => "malformed",
            TokenError::Expired => "expired",
            TokenError::BadSignature => "bad_signature",
            TokenError::Store(_) => "store",
            TokenError::Config(_) => "config",
            TokenError::Internal(_) => "internal",
        }
    }
}

impl From<PasswordError> for TokenError {
    fn from(err: PasswordError) -> Self {
        TokenError::Internal(err.to_string())
    }
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

// =============================================================================
// IssuedToken
// =============================================================================

/// Tokens returned by a successful issuance.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Signed access token.
    pub access_token: String,
    /// Signed refresh token. Absent on refresh reissue.
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Claims embedded in the access token.
    pub claims: Claims,
}

// =============================================================================
// TokenService
// =============================================================================

/// Issues and verifies signed tokens.
///
/// Holds no mutable state: any instance configured with the same secret
/// verifies any token another instance issued.
#[derive(Clone)]
pub struct TokenService {
    config: Arc<TokenConfig>,
    store: Arc<dyn CredentialStore>,
    hasher: CredentialHasher,
    dummy_hash: Arc<str>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
}

impl TokenService {
    /// Creates a token service.
    pub fn new(
        config: TokenConfig,
        store: Arc<dyn CredentialStore>,
        hasher: CredentialHasher,
    ) -> TokenResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let dummy_hash: Arc<str> = hasher.dummy_hash()?.into();

        Ok(Self {
            config: Arc::new(config),
            store,
            hasher,
            dummy_hash,
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Returns the access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_ttl_secs
    }

    // =========================================================================
    // Issuance
    // =========================================================================

    /// Checks credentials and issues an access and a refresh token.
    pub async fn issue(&self, username: &str, password: &str) -> TokenResult<IssuedToken> {
        self.issue_at(username, password, Utc::now().timestamp()).await
    }

    /// Same as [`issue`](Self::issue) with an explicit clock reading.
    pub async fn issue_at(
        &self,
        username: &str,
        password: &str,
        now: i64,
    ) -> TokenResult<IssuedToken> {
        let user = self.store.find_by_username(username).await?;

        let user = match user {
            Some(user) => {
                if !self.check_password(password, &user.password_hash).await? {
                    debug!(username = %username, "Password mismatch");
                    return Err(TokenError::InvalidCredentials);
                }
                user
            }
            None => {
                // Same hashing cost as a real account.
                let _ = self.check_password(password, &self.dummy_hash).await?;
                debug!(username = %username, "Unknown username");
                return Err(TokenError::InvalidCredentials);
            }
        };

        let issued = self.sign_pair(&user, now)?;
        info!(user_id = %user.id, role = %user.role, "Token issued");
        Ok(issued)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The role is re-read from the credential store.
    pub async fn refresh(&self, refresh_token: &str) -> TokenResult<IssuedToken> {
        self.refresh_at(refresh_token, Utc::now().timestamp()).await
    }

    /// Same as [`refresh`](Self::refresh) with an explicit clock reading.
    pub async fn refresh_at(&self, refresh_token: &str, now: i64) -> TokenResult<IssuedToken> {
        let claims = self.decode_at(refresh_token, now, TokenKind::Refresh)?;

        let user = self
            .store
            .find_user(&claims.sub)
            .await?
            .ok_or(TokenError::InvalidCredentials)?;

        let access = Claims::for_user(
            &user,
            TokenKind::Access,
            &self.config.issuer,
            now,
            self.config.access_ttl_secs,
        );
        let access_token = self.sign(&access)?;
        info!(user_id = %user.id, role = %user.role, "Access token reissued");

        Ok(IssuedToken {
            access_token,
            refresh_token: None,
            expires_in: self.config.access_ttl_secs,
            claims: access,
        })
    }

    // =========================================================================
    // Verification
    // =========================================================================

    /// Verifies an access token against the current time.
    pub fn verify(&self, token: &str) -> TokenResult<Claims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies an access token against an explicit clock reading.
    pub fn verify_at(&self, token: &str, now: i64) -> TokenResult<Claims> {
        self.decode_at(token, now, TokenKind::Access)
    }

    fn decode_at(&self, token: &str, now: i64, expected: TokenKind) -> TokenResult<Claims> {
        let parts = TokenParts::split(token).map_err(|reason| {
            debug!(reason, "Token structure invalid");
            TokenError::Malformed
        })?;

        // Undecodable claims are judged by the signature first.
        let claims = serde_json::from_slice::<Claims>(&parts.payload);
        if matches!(&claims, Ok(c) if c.is_expired_at(now)) {
            return Err(TokenError::Expired);
        }

        if parts.header.alg != self.config.algorithm {
            debug!(alg = ?parts.header.alg, "Unexpected token algorithm");
            return Err(TokenError::BadSignature);
        }

        let signed = crypto::verify(
            parts.signature,
            parts.message.as_bytes(),
            &self.decoding_key,
            self.config.algorithm,
        )
        .map_err(|e| TokenError::Internal(format!("Signature check failed: {}", e)))?;
        if !signed {
            return Err(TokenError::BadSignature);
        }

        let claims = claims.map_err(|e| {
            debug!(error = %e, "Signed token carries invalid claims");
            TokenError::Malformed
        })?;

        if claims.iss != self.config.issuer {
            debug!(issuer = %claims.iss, "Foreign token issuer");
            return Err(TokenError::Malformed);
        }

        if claims.kind != expected {
            debug!(
                expected = expected.as_str(),
                actual = claims.kind.as_str(),
                "Wrong token kind"
            );
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn sign(&self, claims: &Claims) -> TokenResult<String> {
        encode(&Header::new(self.config.algorithm), claims, &self.encoding_key)
            .map_err(|e| TokenError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn sign_pair(&self, user: &User, now: i64) -> TokenResult<IssuedToken> {
        let access = Claims::for_user(
            user,
            TokenKind::Access,
            &self.config.issuer,
            now,
            self.config.access_ttl_secs,
        );
        let refresh = Claims::for_user(
            user,
            TokenKind::Refresh,
            &self.config.issuer,
            now,
            self.config.refresh_ttl_secs,
        );

        Ok(IssuedToken {
            access_token: self.sign(&access)?,
            refresh_token: Some(self.sign(&refresh)?),
            expires_in: self.config.access_ttl_secs,
            claims: access,
        })
    }

    /// Runs Argon2 verification off the async executor.
    async fn check_password(&self, password: &str, phc: &str) -> TokenResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let phc = phc.to_string();

        let result = tokio::task::spawn_blocking(move || hasher.verify(&password, &phc))
            .await
            .map_err(|e| TokenError::Internal(format!("Hashing task failed: {}", e)))?;

        match result {
            Ok(matched) => Ok(matched),
            Err(PasswordError::MalformedHash(reason)) => {
                warn!(reason = %reason, "Stored password hash is malformed");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A compact token split into its decoded segments.
struct TokenParts<'a> {
    /// `header.payload` as received, the signed message.
    message: &'a str,
    header: Header,
    payload: Vec<u8>,
    signature: &'a str,
}

impl<'a> TokenParts<'a> {
    fn split(token: &'a str) -> Result<Self, &'static str> {
        let (message, signature) = token.rsplit_once('.').ok_or("missing signature")?;
        let (header, payload) = message.split_once('.').ok_or("missing payload")?;
        if payload.contains('.') {
            return Err("too many segments");
        }

        let header = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| "header is not base64url")?;
        let header: Header =
            serde_json::from_slice(&header).map_err(|_| "header is not a JWT header")?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| "payload is not base64url")?;
        URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| "signature is not base64url")?;

        Ok(Self {
            message,
            header,
            payload,
            signature,
        })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .field("access_ttl_secs", &self.config.access_ttl_secs)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        format!("{:?}", algorithm).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_uppercase().as_str() {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            _ => Err(serde::de::Error::custom(format!(
                "Unsupported algorithm: {} (expected HS256, HS384 or HS512)",
                s
            ))),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
