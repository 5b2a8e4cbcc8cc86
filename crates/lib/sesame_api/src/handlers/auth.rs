//! Authentication request handlers.
//!
//! Handlers that touch the session take the request's [`CookieJar`] and
//! always return it, on failure too, so cookie removals reach the client.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use sesame_core::auth::request::RequestContext;
use sesame_core::models::auth::{AuthType, Credentials, DashboardsInfo, LoginResponse};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedSession;

/// Handler result that carries the cookie jar on both arms.
type JarResult<T> = Result<(CookieJar, T), (CookieJar, AppError)>;

/// Summary of the current session for the UI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub username: String,
    pub auth_type: AuthType,
    pub is_anonymous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    pub expires_at: DateTime<Utc>,
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

/// `POST /api/v1/auth/login`: username/password login.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Json<Credentials>, JsonRejection>,
) -> JarResult<Json<LoginResponse>> {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return Err((jar, AppError::Validation(rejection.body_text()))),
    };
    let request = RequestContext::new(uri, headers);
    let mut store = state.session_store(jar);
    let result = state.service.login(&request, &body, &mut store).await;
    let jar = store.into_inner().into_jar();

    match result {
        Ok(outcome) => Ok((jar, Json(state.service.login_response(&outcome)))),
        Err(e) => Err((jar, e.into())),
    }
}

/// `POST /api/v1/auth/logout`: clear the session. Always succeeds.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    let mut store = state.session_store(jar);
    state.service.logout(&mut store);
    (store.into_inner().into_jar(), Json(json!({})))
}

/// `GET /auth/anonymous`: establish an anonymous session and redirect.
pub async fn anonymous_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: Uri,
    headers: HeaderMap,
) -> JarResult<Response> {
    let request = RequestContext::new(uri, headers);
    let mut store = state.session_store(jar);
    let result = state.service.anonymous_login(&request, &mut store).await;
    let jar = store.into_inner().into_jar();

    match result {
        Ok(outcome) => Ok((jar, found(outcome.location()))),
        Err(e) => Err((jar, e.into())),
    }
}

/// `GET /api/v1/auth/dashboardsinfo`: sign-in options reported by the backend.
pub async fn dashboards_info_handler(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> AppResult<Json<DashboardsInfo>> {
    let request = RequestContext::new(uri, headers);
    let info = state.service.dashboards_info(&request).await?;
    Ok(Json(info))
}

/// `GET /api/v1/auth/session`: the current session. Requires a session.
pub async fn session_handler(
    Extension(AuthenticatedSession(record)): Extension<AuthenticatedSession>,
) -> Json<SessionSummary> {
    Json(SessionSummary {
        username: record.username().to_string(),
        auth_type: record.auth_type(),
        is_anonymous: record.is_anonymous(),
        tenant: record.tenant().map(str::to_string),
        expires_at: record.expires_at(),
    })
}
