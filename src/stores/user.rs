//! Defines the user store trait.

use crate::{
    Error,
    user::{User, UserID},
};

/// Handles the storage and retrieval of [User] objects.
pub trait UserStore {
    /// Get the user with the given email, or `None` if no user has that email.
    fn find_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    /// Insert `user` if it has no ID, otherwise update the stored user with the same ID.
    ///
    /// Returns the stored user, which always has an ID.
    fn save(&self, user: User) -> Result<User, Error>;

    /// Get the user with the given ID, or `None` if no such user exists.
    fn find_by_id(&self, id: UserID) -> Result<Option<User>, Error>;

    /// Whether a user with the given email has been stored.
    fn exists_by_email(&self, email: &str) -> Result<bool, Error>;
}
