//! Authentication middleware that validates cookies, extends sessions, and handles redirects.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Checks for a valid auth cookie and runs the request with the user's ID in
/// the request extensions, otherwise responds with `get_redirect`.
///
/// On success the cookie expiry is pushed out by the configured cookie
/// duration, so active users stay logged in.
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        tracing::warn!("Could not get redirect URL from request. Falling back to dashboard.");

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN.to_owned())
    });
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Error getting local timezone. Redirecting to log in page.");
        return get_redirect(&log_in_redirect_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };
    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(error) => {
            tracing::debug!("Rejected auth cookie: {error}");
            return get_redirect(&log_in_redirect_url);
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(
        jar.clone(),
        state.cookie_duration,
        local_offset,
    ) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, value) in jar.into_response().headers().iter() {
        if key == SET_COOKIE {
            parts.headers.append(key, value.to_owned());
        }
    }

    Response::from_parts(parts, body)
}

/// Middleware for page routes. Requests without a valid auth cookie are
/// redirected to the log-in page.
///
/// Route handlers can use `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware for htmx routes. Requests without a valid auth cookie get an
/// HX-Redirect to the log-in page, since htmx will not follow a 303 for the
/// whole page.
///
/// Route handlers can use `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
