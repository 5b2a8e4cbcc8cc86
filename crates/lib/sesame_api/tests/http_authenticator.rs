//! Integration tests: `HttpAuthenticator` against a throw-away backend on `127.0.0.1:0`.

use axum::Json;
use axum::Router;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::json;
use sesame_api::services::backend::HttpAuthenticator;
use sesame_core::auth::AuthenticatorError;
use sesame_core::auth::authenticator::Authenticator;
use sesame_core::auth::request::RequestContext;
use sesame_core::config::BackendConfig;
use sesame_core::models::auth::Credentials;
use sesame_core::models::sign_in::SignInOption;

/// `alice:secret`
const ALICE_BASIC: &str = "Basic YWxpY2U6c2VjcmV0";

async fn authinfo(headers: HeaderMap) -> Response {
    let authorized = headers.get(AUTHORIZATION).is_some_and(|v| v == ALICE_BASIC)
        || headers.get("x-proxy-user").is_some_and(|v| v == "alice");
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, r#"Basic realm="OpenSearch Security""#)],
        )
            .into_response();
    }
    Json(json!({
        "user_name": "alice",
        "roles": ["all_access"],
        "backend_roles": ["admin"],
        "tenants": { "global_tenant": true, "alice": true }
    }))
    .into_response()
}

async fn dashboardsinfo() -> Json<serde_json::Value> {
    Json(json!({
        "multitenancy_enabled": true,
        "private_tenant_enabled": true,
        "default_tenant": "global_tenant",
        "password_validation_error_message": "",
        "sign_in_options": ["BASIC", "ANONYMOUS"]
    }))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/_plugins/_security/authinfo", get(authinfo))
        .route("/_plugins/_security/dashboardsinfo", get(dashboardsinfo));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

fn authenticator(url: String) -> HttpAuthenticator {
    HttpAuthenticator::new(&BackendConfig { url }).expect("authenticator")
}

fn credentials(password: &str) -> Credentials {
    Credentials {
        username: "alice".into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn authenticate_merges_authinfo_and_dashboardsinfo() {
    let backend = authenticator(spawn_backend().await);
    let principal = backend
        .authenticate(&RequestContext::default(), &credentials("secret"))
        .await
        .expect("authenticate");

    assert_eq!(principal.username, "alice");
    assert_eq!(principal.roles, vec!["all_access".to_string()]);
    assert_eq!(principal.backend_roles, vec!["admin".to_string()]);
    assert!(principal.multitenancy_enabled);
    assert_eq!(principal.default_tenant, "global_tenant");
    assert_eq!(principal.tenants.get("global_tenant"), Some(&true));
}

#[tokio::test]
async fn wrong_password_is_rejected_with_backend_challenge() {
    let backend = authenticator(spawn_backend().await);
    let err = backend
        .authenticate(&RequestContext::default(), &credentials("wrong"))
        .await
        .expect_err("rejected");

    match err {
        AuthenticatorError::Rejected { challenge } => {
            assert_eq!(challenge, r#"Basic realm="OpenSearch Security""#);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn header_authentication_forwards_request_headers() {
    let backend = authenticator(spawn_backend().await);
    let mut headers = HeaderMap::new();
    headers.insert("x-proxy-user", "alice".parse().unwrap());
    let request = RequestContext::new("/auth/anonymous".parse().unwrap(), headers);

    let principal = backend
        .authenticate_with_headers(&request)
        .await
        .expect("authenticate");
    assert_eq!(principal.username, "alice");
}

#[tokio::test]
async fn dashboards_info_parses_sign_in_options() {
    let backend = authenticator(spawn_backend().await);
    let info = backend
        .dashboards_info(&RequestContext::default())
        .await
        .expect("dashboards info");

    assert_eq!(
        info.sign_in_options,
        vec![SignInOption::Basic, SignInOption::Anonymous]
    );
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let backend = authenticator(format!("http://{addr}"));
    let err = backend
        .dashboards_info(&RequestContext::default())
        .await
        .expect_err("unreachable");
    assert!(matches!(err, AuthenticatorError::Unreachable(_)));
}
