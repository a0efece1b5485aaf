//! API key lookup: the `OPENAI_API_KEY` environment variable first, then the
//! system keyring.

use std::error::Error;
use std::fmt;

use keyring::Entry;
use tracing::debug;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
const KEYRING_SERVICE: &str = "palaver";
const KEYRING_USER: &str = "api-key";

/// Describes failures when reading or writing the stored credential.
///
/// Recoverable errors mean the keyring backend was temporarily unavailable
/// (locked or unreachable keychain service).
#[derive(Debug)]
pub enum CredentialError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
    Missing,
}

impl CredentialError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CredentialError::Recoverable(_))
    }
}

impl From<keyring::Error> for CredentialError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                CredentialError::Recoverable(err)
            }
            other => CredentialError::Permanent(other),
        }
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Recoverable(err) => {
                write!(f, "Keyring temporarily unavailable: {err}")
            }
            CredentialError::Permanent(err) => write!(f, "Keyring error: {err}"),
            CredentialError::Missing => write!(
                f,
                "No API key found. Set {API_KEY_ENV} or run 'palaver auth'."
            ),
        }
    }
}

impl Error for CredentialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CredentialError::Recoverable(err) | CredentialError::Permanent(err) => Some(err),
            CredentialError::Missing => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    Keyring,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Environment => write!(f, "{API_KEY_ENV}"),
            KeySource::Keyring => write!(f, "system keyring"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CredentialStore {
    use_keyring: bool,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self { use_keyring: true }
    }

    /// A store that never touches the keyring; only the environment is used.
    pub fn without_keyring() -> Self {
        Self { use_keyring: false }
    }

    pub fn stored_key(&self) -> Result<Option<String>, CredentialError> {
        if !self.use_keyring {
            return Ok(None);
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.get_password() {
            Ok(key) => Ok(Some(key)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn store_key(&self, key: &str) -> Result<(), CredentialError> {
        if !self.use_keyring {
            return Ok(());
        }
        Entry::new(KEYRING_SERVICE, KEYRING_USER)?.set_password(key)?;
        debug!("api key stored in keyring");
        Ok(())
    }

    /// Returns whether a stored key was actually removed.
    pub fn remove_key(&self) -> Result<bool, CredentialError> {
        if !self.use_keyring {
            return Ok(false);
        }
        let entry = Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub fn resolve(&self) -> Result<(String, KeySource), CredentialError> {
        self.resolve_with(std::env::var(API_KEY_ENV).ok())
    }

    /// Resolution with an explicit environment value. Blank values are
    /// treated as unset.
    pub fn resolve_with(
        &self,
        env_value: Option<String>,
    ) -> Result<(String, KeySource), CredentialError> {
        if let Some(key) = non_blank(env_value) {
            return Ok((key, KeySource::Environment));
        }
        match non_blank(self.stored_key()?) {
            Some(key) => Ok((key, KeySource::Keyring)),
            None => Err(CredentialError::Missing),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
