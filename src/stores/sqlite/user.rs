//! Implements a SQLite backed user store.
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error, PasswordHash,
    db::{CreateTable, MapRow},
    stores::UserStore,
    user::{User, UserID},
};

/// Handles the creation and retrieval of User objects.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new user store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl UserStore for SQLiteUserStore {
    fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.lock()?
            .prepare("SELECT id, email, password, name FROM user WHERE email = ?1")?
            .query_row((email,), SQLiteUserStore::map_row)
            .optional()
            .map_err(|e| e.into())
    }

    /// Insert or update `user`.
    ///
    /// # Errors
    ///
    /// Returns a [Error::Validation] if another user already has the same
    /// email, [Error::NotFound] when updating a user that is not in the
    /// database, or [Error::SqlError] for other SQL errors.
    fn save(&self, mut user: User) -> Result<User, Error> {
        let connection = self.lock()?;

        match user.id() {
            None => {
                connection.execute(
                    "INSERT INTO user (email, password, name) VALUES (?1, ?2, ?3)",
                    (user.email(), user.password(), user.name()),
                )?;

                user.set_id(UserID::new(connection.last_insert_rowid()));
            }
            Some(id) => {
                let rows_affected = connection.execute(
                    "UPDATE user SET email = ?1, password = ?2, name = ?3 WHERE id = ?4",
                    (user.email(), user.password(), user.name(), id.as_i64()),
                )?;

                if rows_affected == 0 {
                    return Err(Error::NotFound);
                }
            }
        }

        Ok(user)
    }

    fn find_by_id(&self, id: UserID) -> Result<Option<User>, Error> {
        self.lock()?
            .prepare("SELECT id, email, password, name FROM user WHERE id = :id")?
            .query_row(&[(":id", &id.as_i64())], SQLiteUserStore::map_row)
            .optional()
            .map_err(|e| e.into())
    }

    fn exists_by_email(&self, email: &str) -> Result<bool, Error> {
        self.lock()?
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM user WHERE email = ?1)",
                (email,),
                |row| row.get(0),
            )
            .map_err(|e| e.into())
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                    id INTEGER PRIMARY KEY,
                    email TEXT UNIQUE NOT NULL,
                    password TEXT NOT NULL,
                    name TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_id = row.get(offset)?;
        let email: String = row.get(offset + 1)?;
        let raw_password_hash: String = row.get(offset + 2)?;
        let name: String = row.get(offset + 3)?;

        let id = UserID::new(raw_id);
        let password_hash = PasswordHash::new_unchecked(&raw_password_hash);

        Ok(User::new_unchecked(id, email, password_hash, name))
    }
}
