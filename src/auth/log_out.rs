//! Log-out route handler that invalidates authentication cookies and redirects users.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookie and redirect the client to the log-in page,
/// which will tell them they have been logged out.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (
        jar,
        Redirect::to(&format!("{}?logout=true", endpoints::LOG_IN)),
    )
        .into_response()
}
