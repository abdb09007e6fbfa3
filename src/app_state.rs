//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    BcryptPasswordEncoder, Error,
    auth::DEFAULT_COOKIE_DURATION,
    db::initialize,
    stores::{SQLiteTransactionStore, SQLiteUserStore},
    use_case::{TransactionUseCase, UserUseCase},
};

/// The user use case as wired up for the server.
pub type AppUserUseCase = UserUseCase<SQLiteUserStore, BcryptPasswordEncoder>;

/// The transaction use case as wired up for the server.
pub type AppTransactionUseCase = TransactionUseCase<SQLiteTransactionStore>;

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// Registers and authenticates users.
    pub user_use_case: Arc<AppUserUseCase>,

    /// Adds and summarises transactions.
    pub transaction_use_case: Arc<AppTransactionUseCase>,
}

impl AppState {
    /// Create a new [AppState] backed by a SQLite database.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        password_encoder: BcryptPasswordEncoder,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));
        let user_store = SQLiteUserStore::new(connection.clone());
        let transaction_store = SQLiteTransactionStore::new(connection);

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            user_use_case: Arc::new(UserUseCase::new(user_store, password_encoder)),
            transaction_use_case: Arc::new(TransactionUseCase::new(transaction_store)),
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
