//! # sesame_api
//!
//! HTTP API library for Sesame.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use axum_extra::extract::cookie::CookieJar;
use sesame_core::auth::authenticator::Authenticator;
use sesame_core::auth::service::AuthSessionService;
use sesame_core::auth::store::SessionStore;
use sesame_core::auth::SessionCookieCodec;
use sesame_core::config::SecurityConfig;
use sesame_core::routes;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, login_page};
use crate::services::cookies::CookieJarStorage;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Immutable security configuration.
    pub config: Arc<SecurityConfig>,
    /// Session flows over the configured backend.
    pub service: Arc<AuthSessionService>,
    /// Seals session records into cookie values.
    pub codec: SessionCookieCodec,
}

impl AppState {
    pub fn new(config: Arc<SecurityConfig>, authenticator: Arc<dyn Authenticator>) -> Self {
        let codec = SessionCookieCodec::new(&config.cookie.password);
        let service = Arc::new(AuthSessionService::new(config.clone(), authenticator));
        Self {
            config,
            service,
            codec,
        }
    }

    /// Session store for one request, backed by its cookie jar.
    pub fn session_store(&self, jar: CookieJar) -> SessionStore<CookieJarStorage> {
        SessionStore::new(
            CookieJarStorage::new(jar, self.config.clone()),
            self.codec.clone(),
        )
    }
}

/// Builds the Axum router with all routes and shared state.
///
/// Routes are mounted under `server.base_path` when one is configured.
pub fn router(state: AppState) -> Router {
    // Public routes (no session required)
    let public = Router::new()
        .route(routes::GET_APP_LOGIN, get(login_page::login_page_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_AUTH_LOGOUT, post(auth::logout_handler))
        .route(routes::GET_AUTH_ANONYMOUS, get(auth::anonymous_handler))
        .route(
            routes::GET_AUTH_DASHBOARDSINFO,
            get(auth::dashboards_info_handler),
        );

    // Protected routes (require a session)
    let protected = Router::new()
        .route(routes::GET_AUTH_SESSION, get(auth::session_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    let base_path = state.config.server.base_path.trim_end_matches('/').to_string();
    let app = Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state);

    let app = if base_path.is_empty() {
        app
    } else {
        Router::new().nest(&base_path, app)
    };

    app.layer(TraceLayer::new_for_http())
}
