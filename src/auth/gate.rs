use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::db::models::User;
use crate::error::{AppError, AuthError, DatabaseError};

/// Read access to stored credentials, as needed by [`AuthGate`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    async fn fetch_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
}

/// Checks bearer tokens against the stored password of the named user.
///
/// The token is `base64(sha512(username + password))`: unsalted, with no
/// expiry, and identical on every login. Clients built against the existing
/// API replay it verbatim, so the derivation must not change.
#[derive(Clone)]
pub struct AuthGate {
    lookup: Arc<dyn CredentialLookup>,
}

impl AuthGate {
    pub fn new(lookup: Arc<dyn CredentialLookup>) -> Self {
        Self { lookup }
    }

    pub fn derive_token(username: &str, password: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(username.as_bytes());
        hasher.update(password.as_bytes());
        BASE64.encode(hasher.finalize())
    }

    /// Succeeds iff `presented` equals the token derived from the stored
    /// password. An unknown user is indistinguishable from a wrong token.
    pub async fn authorize(&self, username: &str, presented: &str) -> Result<(), AppError> {
        let user = self.lookup.fetch_by_username(username).await?;

        let authorized = match user {
            Some(user) => {
                let expected = Self::derive_token(&user.username, &user.password);
                bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
            }
            None => false,
        };

        if authorized {
            Ok(())
        } else {
            warn!(username = %username, "Rejected inventory request with invalid token");
            Err(AuthError::InvalidToken.into())
        }
    }
}
