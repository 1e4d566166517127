//! OS-keyring persistence for the session's long-lived credentials.
//!
//! Only the refresh token and the device id are stored; the short-lived auth
//! token and cookies are always re-derived through refresh or login. Keyring
//! failures must never block a fresh QR login; callers treat every error
//! here as "nothing stored".

use thiserror::Error;

const SERVICE_NAME: &str = "chime";

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("credential not found: {key}")]
    NotFound { key: String },

    #[error("keyring access denied: {0}")]
    AccessDenied(String),

    #[error("keyring unavailable: {0}")]
    Unavailable(String),

    #[error("keyring error: {0}")]
    Other(String),
}

impl From<keyring::Error> for SecretsError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => SecretsError::NotFound {
                key: "unknown".into(),
            },
            keyring::Error::NoStorageAccess(e) => SecretsError::AccessDenied(e.to_string()),
            keyring::Error::PlatformFailure(e) => SecretsError::Unavailable(e.to_string()),
            other => SecretsError::Other(other.to_string()),
        }
    }
}

pub type SecretsResult<T> = Result<T, SecretsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    RefreshToken,
    DeviceId,
}

impl SecretKind {
    fn as_str(&self) -> &'static str {
        match self {
            SecretKind::RefreshToken => "refresh_token",
            SecretKind::DeviceId => "device_id",
        }
    }
}

/// Credential store backed by the OS keyring.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    service: String,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.into(),
        }
    }

    fn build_key(kind: SecretKind) -> String {
        format!("session/{}", kind.as_str())
    }

    pub fn store(&self, kind: SecretKind, secret: &str) -> SecretsResult<()> {
        let key = Self::build_key(kind);
        let entry = keyring::Entry::new(&self.service, &key)?;
        entry.set_password(secret)?;
        tracing::debug!(kind = ?kind, "stored credential in keyring");
        Ok(())
    }

    pub fn get(&self, kind: SecretKind) -> SecretsResult<String> {
        let key = Self::build_key(kind);
        let entry = keyring::Entry::new(&self.service, &key)?;
        match entry.get_password() {
            Ok(secret) => Ok(secret),
            Err(keyring::Error::NoEntry) => Err(SecretsError::NotFound { key }),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a credential. Absent entries are not an error.
    pub fn delete(&self, kind: SecretKind) -> SecretsResult<()> {
        let key = Self::build_key(kind);
        let entry = keyring::Entry::new(&self.service, &key)?;
        match entry.delete_credential() {
            Ok(()) => {
                tracing::debug!(kind = ?kind, "deleted credential from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn store_refresh_token(&self, token: &str) -> SecretsResult<()> {
        self.store(SecretKind::RefreshToken, token)
    }

    pub fn get_refresh_token(&self) -> SecretsResult<String> {
        self.get(SecretKind::RefreshToken)
    }

    pub fn store_device_id(&self, device_id: &str) -> SecretsResult<()> {
        self.store(SecretKind::DeviceId, device_id)
    }

    pub fn get_device_id(&self) -> SecretsResult<String> {
        self.get(SecretKind::DeviceId)
    }

    /// Remove everything tied to the current session identity.
    pub fn clear_session(&self) -> SecretsResult<()> {
        let _ = self.delete(SecretKind::RefreshToken);
        let _ = self.delete(SecretKind::DeviceId);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Accessing a real keyring needs a desktop secret service; only the
    // key-shape logic is covered here.

    #[test]
    fn key_building() {
        assert_eq!(
            CredentialStore::build_key(SecretKind::RefreshToken),
            "session/refresh_token"
        );
        assert_eq!(
            CredentialStore::build_key(SecretKind::DeviceId),
            "session/device_id"
        );
    }

    #[test]
    fn secret_kind_as_str() {
        assert_eq!(SecretKind::RefreshToken.as_str(), "refresh_token");
        assert_eq!(SecretKind::DeviceId.as_str(), "device_id");
    }
}
