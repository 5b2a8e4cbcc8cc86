//! Sign-in option tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One authentication mechanism the backend reports as enabled.
///
/// Tags outside the known set are kept as `Unsupported` so they can be
/// surfaced as an error instead of disappearing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignInOption {
    Basic,
    OpenId,
    Saml,
    Anonymous,
    Unsupported(String),
}

impl SignInOption {
    /// Parse a tag from either the backend (`BASIC`, `OPENID`, …) or the
    /// client configuration (`basicauth`, `openid`, …). Case-insensitive.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "basic" | "basicauth" => Self::Basic,
            "openid" | "open_id" => Self::OpenId,
            "saml" => Self::Saml,
            "anonymous" => Self::Anonymous,
            _ => Self::Unsupported(tag.to_string()),
        }
    }

    /// Backend spelling of the tag.
    pub fn as_tag(&self) -> &str {
        match self {
            Self::Basic => "BASIC",
            Self::OpenId => "OPENID",
            Self::Saml => "SAML",
            Self::Anonymous => "ANONYMOUS",
            Self::Unsupported(tag) => tag,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl From<String> for SignInOption {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<SignInOption> for String {
    fn from(option: SignInOption) -> Self {
        option.as_tag().to_string()
    }
}

impl fmt::Display for SignInOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// True when `option` is present in `options`.
pub fn is_offered(option: &SignInOption, options: &[SignInOption]) -> bool {
    options.contains(option)
}
