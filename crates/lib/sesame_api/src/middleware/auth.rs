//! Session middleware: reads the session cookie and gates protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use sesame_core::auth::store::SessionState;
use sesame_core::models::auth::SessionRecord;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Key used to store the session record in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession(pub SessionRecord);

/// Axum middleware: reads the session cookie and injects
/// `AuthenticatedSession` into request extensions. Expired, corrupt and
/// legacy cookies are cleared and answered with 401.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let mut store = state.session_store(jar);
    let session = state.service.session(&mut store);
    let jar = store.into_inner().into_jar();

    match session {
        SessionState::Authenticated(record) => {
            request.extensions_mut().insert(AuthenticatedSession(record));
            (jar, next.run(request).await).into_response()
        }
        other => {
            debug!(state = ?other, "no authenticated session");
            (jar, AppError::Unauthorized { challenge: None }).into_response()
        }
    }
}
