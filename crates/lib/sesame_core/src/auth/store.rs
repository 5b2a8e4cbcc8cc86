//! Request-scoped session store over an injected transport.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::codec::{DecodeError, EncodeError, SessionCookieCodec};
use crate::models::auth::SessionRecord;

/// Raw get/set/clear of the session value, provided by the transport
/// (a cookie jar for HTTP).
pub trait SessionStorage {
    fn get(&self) -> Option<String>;
    fn set(&mut self, value: String);
    fn clear(&mut self);
}

/// Where a request stands, as far as its session is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No usable session.
    Anonymous,
    Authenticated(SessionRecord),
    /// A session existed but its expiry has passed.
    Expired,
    /// The session was just cleared by a logout.
    LoggedOut,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn record(&self) -> Option<&SessionRecord> {
        match self {
            Self::Authenticated(record) => Some(record),
            _ => None,
        }
    }
}

/// Reads, writes and clears the session record through the codec.
pub struct SessionStore<S> {
    storage: S,
    codec: SessionCookieCodec,
}

impl<S: SessionStorage> SessionStore<S> {
    pub fn new(storage: S, codec: SessionCookieCodec) -> Self {
        Self { storage, codec }
    }

    pub fn read(&mut self) -> SessionState {
        self.read_at(Utc::now())
    }

    /// Decode the current value. Unreadable or expired sessions are cleared
    /// and reported as not authenticated; they never fail the request.
    pub fn read_at(&mut self, now: DateTime<Utc>) -> SessionState {
        let Some(value) = self.storage.get() else {
            return SessionState::Anonymous;
        };

        match self.codec.decode(&value) {
            Ok(record) if record.is_expired_at(now) => {
                debug!(username = %record.username(), "session expired");
                self.storage.clear();
                SessionState::Expired
            }
            Ok(record) => SessionState::Authenticated(record),
            Err(DecodeError::LegacyFormatDetected) => {
                debug!("discarding legacy session cookie");
                self.storage.clear();
                SessionState::Anonymous
            }
            Err(e) => {
                warn!("discarding unreadable session cookie: {e}");
                self.storage.clear();
                SessionState::Anonymous
            }
        }
    }

    pub fn write(&mut self, record: &SessionRecord) -> Result<(), EncodeError> {
        let value = self.codec.encode(record)?;
        self.storage.set(value);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Give the transport back, with whatever changes were made.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

/// In-process storage, for tools and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    value: Option<String>,
}

impl MemoryStorage {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self) -> Option<String> {
        self.value.clone()
    }

    fn set(&mut self, value: String) {
        self.value = Some(value);
    }

    fn clear(&mut self) {
        self.value = None;
    }
}
