//! Bearer-token issuance and verification for the gateway.
mod credentials;
mod token;

pub use credentials::StaticCredentials;
pub use token::{AuthError, TokenAuthority, TokenClaims, TokenKind, TokenPair};
