//! Per-request inputs the flows need from the transport.

use http::{HeaderMap, Uri};

/// Query parameters that name a requested tenant, in order of preference.
pub const TENANT_QUERY_PARAMS: &[&str] = &["security_tenant", "securitytenant"];
/// Header that names a requested tenant.
pub const TENANT_HEADER: &str = "securitytenant";

/// The parts of an inbound request the session layer looks at.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestContext {
    pub fn new(uri: Uri, headers: HeaderMap) -> Self {
        Self { uri, headers }
    }

    /// Tenant explicitly requested by the client, if any.
    pub fn tenant_hint(&self) -> Option<String> {
        if let Some(query) = self.uri.query() {
            let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect();
            for name in TENANT_QUERY_PARAMS {
                if let Some((_, value)) = pairs.iter().find(|(k, _)| k == name) {
                    return Some(value.clone());
                }
            }
        }
        self.headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// A bare `/auth/anonymous?…` request is an automatic redirect from a
    /// protected page rather than an explicit click on the anonymous button.
    pub fn is_auto_login_attempt(&self) -> bool {
        self.uri.query().is_some()
    }
}
