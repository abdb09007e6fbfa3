//! The registration page for creating a new account.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    app_state::AppUserUseCase,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link,
        loading_spinner, log_in_register, password_input,
    },
    user::{MAX_NAME_LENGTH, MIN_PASSWORD_LENGTH, User},
};

const PASSWORDS_DO_NOT_MATCH_MSG: &str = "Passwords do not match";

fn text_input(label: &str, name: &str, type_: &str, value: &str, max_length: Option<usize>) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                type=(type_)
                name=(name)
                id=(name)
                class=(FORM_TEXT_INPUT_STYLE)
                required
                maxlength=[max_length]
                value=(value);
        }
    }
}

fn confirm_password_input() -> Markup {
    html! {
        div
        {
            label
                for="password-confirmation"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="password_confirmation"
                id="password-confirmation"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(MIN_PASSWORD_LENGTH);
        }
    }
}

/// The registration form, keeping the email and name the user entered.
///
/// Passwords are never sent back to the client.
fn registration_form(email: &str, name: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" role="alert" { (error_message) }
            }

            (text_input("Email", "email", "email", email, None))
            (text_input("Name", "name", "text", name, Some(MAX_NAME_LENGTH)))
            (password_input("", MIN_PASSWORD_LENGTH, None))
            (confirm_password_input())

            p
                id="password-requirements"
                class="text-sm text-gray-500 dark:text-gray-400 whitespace-pre-line"
            {
                (User::password_requirements())
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Register"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN, "Log in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", "", None);
    let content = log_in_register("Create an account", &registration_form);

    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// Validates and saves new users.
    pub user_use_case: Arc<AppUserUseCase>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            user_use_case: state.user_use_case.clone(),
        }
    }
}

/// The data entered by the user in the registration form.
#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub name: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Handler for registration requests via the POST method.
///
/// On success the client is redirected to the log-in page. Otherwise the
/// form is returned with a message explaining the problem.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    if user_data.password != user_data.password_confirmation {
        return registration_form(
            &user_data.email,
            &user_data.name,
            Some(PASSWORDS_DO_NOT_MATCH_MSG),
        )
        .into_response();
    }

    match state.user_use_case.register_user(
        &user_data.email,
        &user_data.password,
        &user_data.name,
    ) {
        Ok(user) => {
            tracing::info!("Registered new user with ID {:?}", user.id());
            (
                HxRedirect(format!("{}?registered=true", endpoints::LOG_IN)),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::Validation(message)) => {
            registration_form(&user_data.email, &user_data.name, Some(&message)).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while registering a user: {error}");
            registration_form(
                &user_data.email,
                &user_data.name,
                Some("An internal error occurred. Please try again later."),
            )
            .into_response()
        }
    }
}
