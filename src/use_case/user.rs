//! Registering users and looking them up.

use crate::{
    Error, PasswordEncoder,
    stores::UserStore,
    user::{User, UserID},
};

/// The message for a registration with an email that is already taken.
pub(crate) const EMAIL_ALREADY_REGISTERED: &str = "Email already registered";

/// Registers, finds and authenticates users.
#[derive(Debug, Clone)]
pub struct UserUseCase<S, E>
where
    S: UserStore,
    E: PasswordEncoder,
{
    user_store: S,
    password_encoder: E,
}

impl<S, E> UserUseCase<S, E>
where
    S: UserStore,
    E: PasswordEncoder,
{
    /// Create a user use case that stores users in `user_store` and hashes
    /// passwords with `password_encoder`.
    pub fn new(user_store: S, password_encoder: E) -> Self {
        Self {
            user_store,
            password_encoder,
        }
    }

    /// Validate and store a new user.
    ///
    /// The password is hashed before the user is stored. The returned user
    /// has the ID assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the email is already registered or
    /// if any field is invalid, or an error from the password encoder or the
    /// store.
    pub fn register_user(&self, email: &str, password: &str, name: &str) -> Result<User, Error> {
        if self.user_store.exists_by_email(email)? {
            return Err(Error::Validation(EMAIL_ALREADY_REGISTERED.to_owned()));
        }

        let mut user = User::new(email, password, name)?;
        user.set_password(self.password_encoder.encode(password)?);

        self.user_store.save(user)
    }

    /// Get the user registered with `email`.
    ///
    /// # Errors
    ///
    /// Returns [Error::UserNotFound] if no user has that email.
    pub fn find_by_email(&self, email: &str) -> Result<User, Error> {
        self.user_store
            .find_by_email(email)?
            .ok_or(Error::UserNotFound)
    }

    /// Get the user with the ID `id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::UserNotFound] if no user has that ID.
    pub fn find_by_id(&self, id: UserID) -> Result<User, Error> {
        self.user_store.find_by_id(id)?.ok_or(Error::UserNotFound)
    }

    /// Get the user with `email` if `password` matches their stored password.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCredentials] if the email is unknown or the
    /// password does not match.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, Error> {
        let user = match self.find_by_email(email) {
            Ok(user) => user,
            Err(Error::UserNotFound) => {
                // Unknown emails pay the same hashing cost as wrong passwords.
                self.password_encoder.encode(password)?;
                return Err(Error::InvalidCredentials);
            }
            Err(error) => return Err(error),
        };

        if self.password_encoder.matches(password, user.password())? {
            Ok(user)
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}
