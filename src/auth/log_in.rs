//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    alert::Alert,
    app_state::AppUserUseCase,
    auth::{invalidate_auth_cookie, normalize_redirect_url, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link,
        loading_spinner, log_in_register, password_input,
    },
    timezone::get_local_offset,
};

pub(crate) const INVALID_CREDENTIALS_ERROR_MSG: &str =
    "Invalid credentials. Please check your email and password.";
const LOGGED_OUT_MSG: &str = "You have been successfully logged out.";
const REGISTERED_MSG: &str = "Registration successful! Please login.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

fn email_input(email: &str) -> Markup {
    html! {
        div
        {
            label for="email" class=(FORM_LABEL_STYLE) { "Email" }

            input
                type="email"
                name="email"
                id="email"
                placeholder="name@example.com"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus
                value=(email);
        }
    }
}

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (email_input(email))
            (password_input("", 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                (link(endpoints::REGISTER, "Register here"))
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(raw_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
            }
            None
        }
    }
}

/// The query parameters accepted by the log-in page.
#[derive(Debug, Default, Deserialize)]
pub struct LogInQuery {
    /// Where to send the user after they log in.
    pub redirect_url: Option<String>,
    /// Show the invalid credentials message.
    pub error: Option<bool>,
    /// Show the logged out message.
    pub logout: Option<bool>,
    /// Show the registration success message.
    pub registered: Option<bool>,
}

impl LogInQuery {
    fn alert(&self) -> Option<Alert<'static>> {
        if self.error == Some(true) {
            Some(Alert::Error {
                message: INVALID_CREDENTIALS_ERROR_MSG,
                details: "",
            })
        } else if self.logout == Some(true) {
            Some(Alert::Success {
                message: LOGGED_OUT_MSG,
                details: "",
            })
        } else if self.registered == Some(true) {
            Some(Alert::Success {
                message: REGISTERED_MSG,
                details: "",
            })
        } else {
            None
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<LogInQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let alert = query.alert();
    let form = html! {
        @if let Some(alert) = alert {
            (alert.into_html())
        }
        (log_in_form)
    };
    let content = log_in_register("Log in to your account", &form);

    base("Log In", &[], &content).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// Checks the email and password.
    pub user_use_case: Arc<AppUserUseCase>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            user_use_case: state.user_use_case.clone(),
        }
    }
}

impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The password is not validated here since it is only compared against the
/// stored hash.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// Any `Some` value means `true`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie set and the client is
/// redirected to the requested page or the dashboard. Otherwise, the form is
/// returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    let user = match state
        .user_use_case
        .authenticate(&user_data.email, &user_data.password)
    {
        Ok(user) => user,
        Err(Error::InvalidCredentials) => {
            tracing::info!("Failed log-in attempt for {}", user_data.email);
            return log_in_form(
                &user_data.email,
                Some(INVALID_CREDENTIALS_ERROR_MSG),
                redirect_url,
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(&user_data.email, Some(INTERNAL_ERROR_MSG), redirect_url)
                .into_response();
        }
    };

    let Some(user_id) = user.id() else {
        tracing::error!("Authenticated user {} has no ID", user.email());
        return log_in_form(&user_data.email, Some(INTERNAL_ERROR_MSG), redirect_url)
            .into_response();
    };

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_auth_cookie(jar.clone(), user_id, cookie_duration, local_offset) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_url.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}
