//! Cookie-holding HTTP client for the Sesame endpoints.

use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use sesame_core::models::auth::{AuthType, DashboardsInfo, LoginResponse};
use sesame_core::models::sign_in::{SignInOption, is_offered};
use sesame_core::routes;
use tracing::debug;
use url::Url;

use crate::error::ClientError;

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The current session as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub username: String,
    pub auth_type: AuthType,
    pub is_anonymous: bool,
    #[serde(default)]
    pub tenant: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Client for one Sesame deployment. Keeps the session cookie between calls.
#[derive(Debug, Clone)]
pub struct SesameClient {
    http: Client,
    base_url: Url,
}

impl SesameClient {
    /// `base_url` includes the server base path, e.g. `https://host/dashboards`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, route: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(route.trim_start_matches('/'))?)
    }

    async fn check(resp: Response) -> Result<Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp
            .json::<ErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_else(|_| status.to_string());
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// `GET /api/v1/auth/dashboardsinfo`.
    pub async fn dashboards_info(&self) -> Result<DashboardsInfo, ClientError> {
        let resp = self
            .http
            .get(self.url(routes::GET_AUTH_DASHBOARDSINFO)?)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Sign-in options the server currently reports.
    pub async fn sign_in_options(&self) -> Result<Vec<SignInOption>, ClientError> {
        Ok(self.dashboards_info().await?.sign_in_options)
    }

    /// Re-query the server and report whether `option` is still offered.
    pub async fn revalidate(&self, option: &SignInOption) -> Result<bool, ClientError> {
        let options = self.sign_in_options().await?;
        let offered = is_offered(option, &options);
        debug!(%option, ?options, offered, "revalidated sign-in option");
        Ok(offered)
    }

    /// `POST /api/v1/auth/login`.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let resp = self
            .http
            .post(self.url(routes::POST_AUTH_LOGIN)?)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// `POST /api/v1/auth/logout`.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let resp = self
            .http
            .post(self.url(routes::POST_AUTH_LOGOUT)?)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// `GET /api/v1/auth/session`; `None` when there is no session.
    pub async fn session(&self) -> Result<Option<SessionInfo>, ClientError> {
        let resp = self
            .http
            .get(self.url(routes::GET_AUTH_SESSION)?)
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        Ok(Some(Self::check(resp).await?.json().await?))
    }
}
