//! HMAC-SHA256 bearer tokens in JWT form.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use foundry_core::is_expired_unix;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_HEADER: &[u8] = br#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `TokenKind` values.
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Claims carried inside an issued token.
pub struct TokenClaims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Access/refresh pair handed out at login.
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
/// Enumerates supported `AuthError` values.
pub enum AuthError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is expired")]
    Expired,
    #[error("token kind is not accepted here")]
    WrongKind,
    #[error("failed to initialize token signer")]
    Signing,
}

/// Issues and verifies the gateway's bearer tokens. Clocks are passed in as
/// Unix seconds so expiry behavior stays deterministic under test.
#[derive(Debug, Clone)]
pub struct TokenAuthority {
    secret: Vec<u8>,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
}

impl TokenAuthority {
    pub fn new(
        secret: impl Into<Vec<u8>>,
        access_ttl_seconds: u64,
        refresh_ttl_seconds: u64,
    ) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_seconds,
            refresh_ttl_seconds,
        }
    }

    pub fn issue_pair(&self, subject: &str, now_unix: u64) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(subject, TokenKind::Access, now_unix)?,
            refresh: self.issue(subject, TokenKind::Refresh, now_unix)?,
        })
    }

    pub fn issue(
        &self,
        subject: &str,
        kind: TokenKind,
        now_unix: u64,
    ) -> Result<String, AuthError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl_seconds,
            TokenKind::Refresh => self.refresh_ttl_seconds,
        };
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now_unix,
            exp: now_unix.saturating_add(ttl),
            kind,
        };

        let header = URL_SAFE_NO_PAD.encode(TOKEN_HEADER);
        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).map_err(|_| AuthError::Signing)?);
        let signing_input = format!("{header}.{payload}");
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes())?);
        Ok(format!("{signing_input}.{signature}"))
    }

    pub fn verify(
        &self,
        token: &str,
        expected: TokenKind,
        now_unix: u64,
    ) -> Result<TokenClaims, AuthError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::Malformed);
        };

        let observed = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::Malformed)?;
        let signing_input = format!("{header}.{payload}");
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::Signing)?;
        mac.update(signing_input.as_bytes());
        if mac.verify_slice(&observed).is_err() {
            return Err(AuthError::InvalidSignature);
        }

        let claims_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::Malformed)?;
        let claims: TokenClaims =
            serde_json::from_slice(&claims_bytes).map_err(|_| AuthError::Malformed)?;
        if claims.kind != expected {
            return Err(AuthError::WrongKind);
        }
        if is_expired_unix(Some(claims.exp), now_unix) {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, input: &[u8]) -> Result<Vec<u8>, AuthError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::Signing)?;
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
