//! HTTP authenticator against the security backend.
//!
//! `authinfo` verifies the identity; `dashboardsinfo` supplies the
//! multitenancy settings and sign-in options. Both are plain GETs carrying
//! either a Basic `Authorization` header or the inbound request's headers.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{
    AUTHORIZATION, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HOST, HeaderMap, HeaderValue,
    TRANSFER_ENCODING, WWW_AUTHENTICATE,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sesame_core::auth::AuthenticatorError;
use sesame_core::auth::authenticator::Authenticator;
use sesame_core::auth::request::RequestContext;
use sesame_core::config::BackendConfig;
use sesame_core::models::auth::{CredentialCarrier, Credentials, DashboardsInfo, Principal};
use tracing::debug;
use url::Url;

const AUTHINFO_PATH: &str = "_plugins/_security/authinfo";
const DASHBOARDSINFO_PATH: &str = "_plugins/_security/dashboardsinfo";

#[derive(Debug, Deserialize)]
struct AuthInfo {
    user_name: String,
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    backend_roles: Vec<String>,
    #[serde(default)]
    tenants: BTreeMap<String, bool>,
}

/// [`Authenticator`] backed by the security plugin's REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: reqwest::Client,
    authinfo_url: Url,
    dashboardsinfo_url: Url,
}

impl HttpAuthenticator {
    pub fn new(config: &BackendConfig) -> Result<Self, url::ParseError> {
        let mut base = config.url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)?;
        Ok(Self {
            client: reqwest::Client::new(),
            authinfo_url: base.join(AUTHINFO_PATH)?,
            dashboardsinfo_url: base.join(DASHBOARDSINFO_PATH)?,
        })
    }

    /// Inbound headers minus those never forwarded to the backend.
    fn forwarded_headers(request: &RequestContext) -> HeaderMap {
        let mut headers = request.headers.clone();
        for name in [
            HOST,
            CONTENT_LENGTH,
            CONTENT_TYPE,
            TRANSFER_ENCODING,
            CONNECTION,
            COOKIE,
            AUTHORIZATION,
        ] {
            headers.remove(name);
        }
        headers
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<T, AuthenticatorError> {
        debug!(%url, "backend request");
        let response = self
            .client
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| AuthenticatorError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            return Err(AuthenticatorError::Rejected { challenge });
        }
        if !status.is_success() {
            return Err(AuthenticatorError::InvalidResponse(format!(
                "{url} returned {status}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AuthenticatorError::InvalidResponse(e.to_string()))
    }

    async fn principal(&self, headers: HeaderMap) -> Result<Principal, AuthenticatorError> {
        let info: AuthInfo = self.get_json(&self.authinfo_url, headers.clone()).await?;
        if info.user_name.is_empty() {
            return Err(AuthenticatorError::InvalidResponse(
                "authinfo returned an empty user name".into(),
            ));
        }
        let dashboards: DashboardsInfo = self.get_json(&self.dashboardsinfo_url, headers).await?;

        Ok(Principal {
            username: info.user_name,
            roles: info.roles,
            backend_roles: info.backend_roles,
            multitenancy_enabled: dashboards.multitenancy_enabled,
            private_tenant_enabled: dashboards.private_tenant_enabled,
            default_tenant: dashboards.default_tenant,
            tenants: info.tenants,
        })
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(
        &self,
        request: &RequestContext,
        credentials: &Credentials,
    ) -> Result<Principal, AuthenticatorError> {
        let carrier = CredentialCarrier::basic(credentials);
        let value = HeaderValue::from_str(&carrier.auth_header_value)
            .map_err(|e| AuthenticatorError::InvalidResponse(e.to_string()))?;
        let mut headers = Self::forwarded_headers(request);
        headers.insert(AUTHORIZATION, value);
        self.principal(headers).await
    }

    async fn authenticate_with_headers(
        &self,
        request: &RequestContext,
    ) -> Result<Principal, AuthenticatorError> {
        self.principal(Self::forwarded_headers(request)).await
    }

    async fn dashboards_info(
        &self,
        request: &RequestContext,
    ) -> Result<DashboardsInfo, AuthenticatorError> {
        self.get_json(&self.dashboardsinfo_url, Self::forwarded_headers(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_under_the_backend_path() {
        let authenticator = HttpAuthenticator::new(&BackendConfig {
            url: "http://search:9200/prefix".into(),
        })
        .unwrap();
        assert_eq!(
            authenticator.authinfo_url.as_str(),
            "http://search:9200/prefix/_plugins/_security/authinfo"
        );
        assert_eq!(
            authenticator.dashboardsinfo_url.as_str(),
            "http://search:9200/prefix/_plugins/_security/dashboardsinfo"
        );
    }

    #[test]
    fn invalid_backend_url_is_rejected() {
        let result = HttpAuthenticator::new(&BackendConfig {
            url: "not a url".into(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn forwarded_headers_drop_cookies_and_authorization() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("sesame_session=x"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        let request = RequestContext::new("/auth/anonymous".parse().unwrap(), headers);

        let forwarded = HttpAuthenticator::forwarded_headers(&request);
        assert!(forwarded.get(COOKIE).is_none());
        assert!(forwarded.get(AUTHORIZATION).is_none());
        assert_eq!(forwarded["x-forwarded-for"], "10.0.0.1");
    }
}
