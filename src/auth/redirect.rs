//! Helpers for redirect URLs during authentication flows.

use axum::{
    extract::Request,
    http::{HeaderMap, Uri},
};
use tracing::{error, warn};

use crate::endpoints;

/// Only same-site paths are accepted, and never the log-in page itself.
fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    path != endpoints::LOG_IN
}

/// Get the path and query of `raw_url` if it is safe to redirect to after logging in.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// HX-Current-URL holds the full URL of the page, so the scheme and host are dropped.
fn normalize_hx_current_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

fn is_hx_request(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"))
}

/// Build the URL of the log-in page that sends the user back to where they
/// were once they have logged in.
///
/// For htmx requests the page the user is looking at is taken from the
/// HX-Current-URL header, since the request URI is the form endpoint.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if is_hx_request(request.headers()) {
        redirect_target_from_hx_request(request)?
    } else {
        redirect_target_from_request_uri(request)?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

pub(super) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_request_uri(request: &Request) -> Option<String> {
    let path_and_query = request.uri().path_and_query()?.as_str();
    normalize_redirect_url(path_and_query)
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let Some(current_url) = request
        .headers()
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    else {
        warn!("Missing HX-Current-URL header for htmx request.");
        return None;
    };

    let redirect_url = normalize_hx_current_url(current_url);
    if redirect_url.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}
