//! Where to go after logging in.
//!
//! The login page carries the target in its `nextUrl` query parameter.
//! Targets containing `//` are treated as absent.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;
use url::form_urlencoded;

/// Query parameters that already select a tenant in a target URL.
const TENANT_PARAMS: &[&str] = &["security_tenant", "securitytenant", "securityTenant_"];

/// Characters escaped by a URI component encoding: all but alphanumerics and
/// `-_.!~*'()`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn next_url_param(search: &str) -> Option<String> {
    form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
        .find(|(k, _)| k == "nextUrl")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty() && !v.contains("//"))
}

/// `?nextUrl=…` suffix for federated login links.
///
/// `search` and `hash` are the login page's own query string and fragment,
/// each with or without its leading `?` / `#`.
pub fn next_url_query(search: &str, hash: &str) -> String {
    match next_url_param(search) {
        Some(next) => {
            let encoded = utf8_percent_encode(&next, URI_COMPONENT);
            format!("?nextUrl={encoded}{}", fragment(hash))
        }
        None => "?nextUrl=%2F".to_string(),
    }
}

/// Path to navigate to after a successful password login.
///
/// Falls back to `{base_path}/`. A saved tenant is appended as
/// `security_tenant` unless the target already names one.
pub fn next_path(
    base_path: &str,
    search: &str,
    hash: &str,
    saved_tenant: Option<&str>,
) -> String {
    let fallback = format!("{}/", base_path.trim_end_matches('/'));
    let next = next_url_param(search).unwrap_or_else(|| fallback.clone());

    let Ok(mut url) = Url::parse(&format!("http://localhost{next}{}", fragment(hash))) else {
        return fallback;
    };

    if let Some(tenant) = saved_tenant.filter(|t| !t.is_empty()) {
        let has_tenant = url
            .query_pairs()
            .any(|(k, _)| TENANT_PARAMS.contains(&k.as_ref()));
        if !has_tenant {
            url.query_pairs_mut().append_pair("security_tenant", tenant);
        }
    }

    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        path.push('#');
        path.push_str(fragment);
    }
    path
}

fn fragment(hash: &str) -> String {
    let hash = hash.trim_start_matches('#');
    if hash.is_empty() {
        String::new()
    } else {
        format!("#{hash}")
    }
}
