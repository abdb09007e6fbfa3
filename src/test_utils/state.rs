use rusqlite::Connection;

use crate::{AppState, BcryptPasswordEncoder, User};

pub(crate) const TEST_EMAIL: &str = "ann@example.com";
pub(crate) const TEST_PASSWORD: &str = "Secret1!";

/// An app state backed by an in-memory database.
///
/// Passwords are hashed with the lowest bcrypt cost to keep tests fast.
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(
        connection,
        "foobar",
        "Etc/UTC",
        BcryptPasswordEncoder::new(4),
    )
    .expect("Could not create app state")
}

/// Register a user with [TEST_EMAIL] and [TEST_PASSWORD].
pub(crate) fn register_test_user(state: &AppState) -> User {
    state
        .user_use_case
        .register_user(TEST_EMAIL, TEST_PASSWORD, "Ann")
        .expect("Could not register test user")
}
