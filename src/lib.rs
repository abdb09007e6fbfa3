//! A web app for tracking personal income and expenses.
//!
//! Users register, log in, record transactions and view a dashboard with
//! their total income, total expenses and balance. The library serves HTML
//! pages directly, with htmx handling form submissions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod dashboard;
mod db;
mod dto;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod new_transaction;
mod not_found;
mod password;
mod routing;
mod stores;
mod timezone;
mod transaction;
mod use_case;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, create_cookie_key};
pub use db::initialize as initialize_db;
pub use dto::{TransactionDto, UserDto};
pub use logging::logging_middleware;
pub use password::{BcryptPasswordEncoder, PasswordEncoder, PasswordHash};
pub use routing::build_router;
pub use stores::{SQLiteTransactionStore, SQLiteUserStore, TransactionStore, UserStore};
pub use transaction::{Transaction, TransactionID, TransactionType};
pub use use_case::{FinancialSummary, TransactionUseCase, UserUseCase};
pub use user::{User, UserID};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response, use_case::EMAIL_ALREADY_REGISTERED,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// Input from the user broke one of the domain rules.
    ///
    /// The message is written for the user and can be shown as is.
    #[error("{0}")]
    Validation(String),

    /// No user matched the given details.
    #[error("User not found")]
    UserNotFound,

    /// The email and password combination given at log-in did not match a user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token in the cookie has passed its expiry time.
    #[error("the auth token has expired")]
    TokenExpired,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::Validation(EMAIL_ALREADY_REGISTERED.to_owned())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::UserNotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as an alert fragment for htmx requests.
    fn into_alert_response(self) -> Response {
        match self {
            Error::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction",
                    details: &message,
                }
                .into_html(),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings",
                    details: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                        ensure the timezone has been set to valid, canonical timezone string"
                    ),
                }
                .into_html(),
            )
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong",
                    details: "An unexpected error occurred, check the server logs for more details.",
                }
                .into_html(),
            )
                .into_response(),
        }
    }
}
