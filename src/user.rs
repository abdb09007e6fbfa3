//! The user domain model and the rules for what counts as a valid user.

use std::{fmt::Display, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// The minimum number of characters in a password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The maximum number of characters in a user's name.
pub const MAX_NAME_LENGTH: usize = 100;

/// The special characters a password must contain at least one of.
pub const PASSWORD_SPECIAL_CHARACTERS: &str = "@#$%^&+=!";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9+_.-]*[A-Za-z0-9])?@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$",
    )
    .expect("Invalid email regex pattern")
});

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered (or about to be registered) user of the application.
///
/// A user can only be built through [User::new], which validates the email,
/// password and name. The ID is assigned by the user store on the first save,
/// and the plain text password is replaced by its hash with
/// [User::set_password] before the user is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: Option<UserID>,
    email: String,
    password: String,
    name: String,
}

impl User {
    /// Create a new user and validate each field.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] describing the first rule that was
    /// broken. Fields are checked in the order email, password, name.
    pub fn new(email: &str, password: &str, name: &str) -> Result<Self, Error> {
        validate_email(email)?;
        validate_password(password)?;
        validate_name(name)?;

        Ok(Self {
            id: None,
            email: email.to_owned(),
            password: password.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Create a user without any validation.
    ///
    /// Intended for rows read back from the database, which were validated
    /// before they were inserted.
    pub fn new_unchecked(id: UserID, email: String, password_hash: PasswordHash, name: String) -> Self {
        Self {
            id: Some(id),
            email,
            password: password_hash.to_string(),
            name,
        }
    }

    /// The user's ID, or `None` if the user has not been saved yet.
    pub fn id(&self) -> Option<UserID> {
        self.id
    }

    /// The email the user logs in with.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The password as it is currently held.
    ///
    /// This is the plain text password until [User::set_password] is called,
    /// and the password hash afterwards.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// The user's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the ID assigned by the user store.
    pub fn set_id(&mut self, id: UserID) {
        self.id = Some(id);
    }

    /// Replace the password with its hash.
    pub fn set_password(&mut self, password_hash: PasswordHash) {
        self.password = password_hash.to_string();
    }

    /// Whether `email` matches the accepted email format.
    pub fn is_valid_email(email: &str) -> bool {
        EMAIL_PATTERN.is_match(email)
    }

    /// Whether `password` satisfies the length and complexity rules.
    pub fn is_valid_password(password: &str) -> bool {
        validate_password(password).is_ok()
    }

    /// A human readable description of the password rules.
    pub fn password_requirements() -> String {
        format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long and contain:\n\
            - At least one digit\n\
            - At least one lowercase letter\n\
            - At least one uppercase letter\n\
            - At least one special character ({PASSWORD_SPECIAL_CHARACTERS})\n\
            - No whitespace allowed"
        )
    }
}

fn validate_email(email: &str) -> Result<(), Error> {
    if email.trim().is_empty() {
        return Err(Error::Validation("Email cannot be empty".to_owned()));
    }

    if !User::is_valid_email(email) {
        return Err(Error::Validation("Invalid email format".to_owned()));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), Error> {
    if password.trim().is_empty() {
        return Err(Error::Validation("Password cannot be empty".to_owned()));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password
        .chars()
        .any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(c));
    let has_whitespace = password.chars().any(char::is_whitespace);

    if !(has_digit && has_lowercase && has_uppercase && has_special) || has_whitespace {
        return Err(Error::Validation(
            "Password must meet complexity requirements: digit, lowercase, uppercase, special char, no spaces"
                .to_owned(),
        ));
    }

    Ok(())
}

fn validate_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Name cannot be empty".to_owned()));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(())
}
