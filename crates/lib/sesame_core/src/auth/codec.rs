//! Session cookie codec: seals a [`SessionRecord`] into a cookie value.
//!
//! Current format: `2.` followed by base64url(`nonce || ciphertext || tag`),
//! AES-256-GCM over the JSON record with the version prefix as associated
//! data. Values written by earlier releases are recognised and reported as
//! [`DecodeError::LegacyFormatDetected`] so callers can discard them.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::auth::SessionRecord;

/// Version tag of the format written by [`SessionCookieCodec::encode`].
pub const CURRENT_VERSION: &str = "2";

/// Prefixes of formats that are no longer written: the iron seal used by the
/// previous release, and our own unsealed v1.
const LEGACY_PREFIXES: &[&str] = &["Fe26.", "1."];

/// Nonce size for AES-256-GCM (12 bytes).
const NONCE_SIZE: usize = 12;
/// AES-256 key size (32 bytes).
const KEY_SIZE: usize = 32;
/// GCM tag size (16 bytes).
const TAG_SIZE: usize = 16;

/// Why a cookie value could not be turned back into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("session cookie uses a legacy format")]
    LegacyFormatDetected,

    #[error("corrupt session cookie: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("session serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("session sealing failed")]
    Seal,
}

/// Seals and unseals session records. Pure; holds only the derived key.
#[derive(Clone)]
pub struct SessionCookieCodec {
    key: [u8; KEY_SIZE],
}

impl std::fmt::Debug for SessionCookieCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionCookieCodec")
    }
}

impl SessionCookieCodec {
    /// Derive the sealing key from the configured cookie password.
    pub fn new(password: &str) -> Self {
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&Sha256::digest(password.as_bytes()));
        Self { key }
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(&self.key.into())
    }

    pub fn encode(&self, record: &SessionRecord) -> Result<String, EncodeError> {
        let plaintext = serde_json::to_vec(record)?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: &plaintext,
                    aad: CURRENT_VERSION.as_bytes(),
                },
            )
            .map_err(|_| EncodeError::Seal)?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(format!("{CURRENT_VERSION}.{}", URL_SAFE_NO_PAD.encode(&combined)))
    }

    /// Never panics on malformed input; every failure is a [`DecodeError`].
    pub fn decode(&self, value: &str) -> Result<SessionRecord, DecodeError> {
        if is_legacy(value) {
            return Err(DecodeError::LegacyFormatDetected);
        }

        let body = value
            .strip_prefix(CURRENT_VERSION)
            .and_then(|rest| rest.strip_prefix('.'))
            .ok_or_else(|| DecodeError::Corrupt("unknown format".into()))?;

        let combined = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|e| DecodeError::Corrupt(format!("base64: {e}")))?;
        if combined.len() < NONCE_SIZE + TAG_SIZE {
            return Err(DecodeError::Corrupt("too short".into()));
        }
        let (nonce, ciphertext) = combined.split_at(NONCE_SIZE);

        let plaintext = self
            .cipher()
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: CURRENT_VERSION.as_bytes(),
                },
            )
            .map_err(|_| DecodeError::Corrupt("seal verification failed".into()))?;

        let record: SessionRecord = serde_json::from_slice(&plaintext)
            .map_err(|e| DecodeError::Corrupt(format!("json: {e}")))?;
        record.check().map_err(DecodeError::Corrupt)?;
        Ok(record)
    }
}

/// True for values in a format this release no longer writes.
pub fn is_legacy(value: &str) -> bool {
    LEGACY_PREFIXES.iter().any(|p| value.starts_with(p))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::*;
    use crate::models::auth::{CredentialCarrier, Credentials};

    const PASSWORD: &str = "0123456789abcdef0123456789abcdef";

    fn password_record() -> SessionRecord {
        let creds = Credentials {
            username: "alice".into(),
            password: "wonderland".into(),
        };
        SessionRecord::password(
            "alice",
            CredentialCarrier::basic(&creds),
            TimeDelta::hours(1),
            Utc::now(),
        )
        .unwrap()
        .with_tenant(Some("__user__".into()))
    }

    #[test]
    fn decodes_what_it_encodes() {
        let codec = SessionCookieCodec::new(PASSWORD);
        for record in [
            password_record(),
            SessionRecord::anonymous("anon", TimeDelta::minutes(5), Utc::now()).unwrap(),
        ] {
            let value = codec.encode(&record).unwrap();
            assert!(value.starts_with("2."));
            assert_eq!(codec.decode(&value).unwrap(), record);
        }
    }

    #[test]
    fn sealed_value_hides_credentials() {
        let codec = SessionCookieCodec::new(PASSWORD);
        let value = codec.encode(&password_record()).unwrap();
        assert!(!value.contains("alice"));
        assert!(!value.contains("Basic"));
    }

    #[test]
    fn legacy_values_are_detected() {
        let codec = SessionCookieCodec::new(PASSWORD);
        assert_eq!(
            codec.decode("Fe26.2**0cdd6a2e**c1a2b3**sealed"),
            Err(DecodeError::LegacyFormatDetected)
        );
        assert_eq!(
            codec.decode("1.eyJ1c2VybmFtZSI6ImFkbWluIn0"),
            Err(DecodeError::LegacyFormatDetected)
        );
    }

    #[test]
    fn malformed_values_are_corrupt() {
        let codec = SessionCookieCodec::new(PASSWORD);
        for value in ["", "garbage", "2.", "2.!!!", "2.AAAA", "3.AAAA"] {
            assert!(
                matches!(codec.decode(value), Err(DecodeError::Corrupt(_))),
                "{value:?} should be corrupt"
            );
        }
    }

    #[test]
    fn wrong_key_is_corrupt() {
        let value = SessionCookieCodec::new(PASSWORD)
            .encode(&password_record())
            .unwrap();
        let other = SessionCookieCodec::new("another-password-another-password");
        assert!(matches!(other.decode(&value), Err(DecodeError::Corrupt(_))));
    }

    #[test]
    fn tampered_value_is_corrupt() {
        let codec = SessionCookieCodec::new(PASSWORD);
        let mut value = codec.encode(&password_record()).unwrap();
        let last = value.pop().unwrap();
        value.push(if last == 'A' { 'B' } else { 'A' });
        assert!(matches!(codec.decode(&value), Err(DecodeError::Corrupt(_))));
    }
}
