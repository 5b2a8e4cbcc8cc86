//! Login page shell.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, Html, IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::AppState;
use crate::services::cookies;

const DEFAULT_TITLE: &str = "Log in";

/// `GET /app/login`: clear any stale session and serve the page shell.
///
/// The previous release's cookie is expired with its own name and path in
/// a separate `Set-Cookie` header.
pub async fn login_page_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> impl IntoResponse {
    let mut store = state.session_store(jar);
    store.clear();
    debug!("login page requested; session cleared");

    let legacy = cookies::clear_legacy_cookie(&state.config.cookie);
    (
        store.into_inner().into_jar(),
        AppendHeaders([(SET_COOKIE, legacy.to_string())]),
        Html(render_shell(
            &state.config.ui.basicauth.login.title,
            &state.config.server.base_path,
        )),
    )
}

fn render_shell(title: &str, base_path: &str) -> String {
    let title = if title.is_empty() { DEFAULT_TITLE } else { title };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <base href=\"{}/\">\n<title>{}</title>\n</head>\n\
         <body><div id=\"login\"></div></body>\n</html>\n",
        escape_html(base_path.trim_end_matches('/')),
        escape_html(title),
    )
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_uses_default_title() {
        let html = render_shell("", "");
        assert!(html.contains("<title>Log in</title>"));
        assert!(html.contains("<base href=\"/\">"));
    }

    #[test]
    fn shell_escapes_configured_title() {
        let html = render_shell("<Acme & Co>", "/dash/");
        assert!(html.contains("<title>&lt;Acme &amp; Co&gt;</title>"));
        assert!(html.contains("<base href=\"/dash/\">"));
    }
}
