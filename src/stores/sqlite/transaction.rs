//! Implements a SQLite backed transaction store.
use std::{
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{Connection, OptionalExtension, Row, types::Type};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    stores::TransactionStore,
    transaction::{Transaction, TransactionID, TransactionType},
    user::{User, UserID},
};

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction belongs to a [User], the user table must be
/// set up in the database and the owner must exist before a transaction is saved.
///
/// Dates are stored in UTC so that ordering by the date column gives
/// chronological order.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }

    fn query_by_user(&self, user: &User, query: &str) -> Result<Vec<Transaction>, Error> {
        let Some(user_id) = user.id() else {
            // A user that has not been saved cannot own any stored transactions.
            return Ok(Vec::new());
        };

        let connection = self.lock()?;
        let mut statement = connection.prepare(query)?;
        let transactions = statement
            .query_map((user_id.as_i64(),), Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect();

        transactions
    }
}

fn map_foreign_key_error(error: rusqlite::Error) -> Error {
    match error {
        // Code 787 occurs when a FOREIGN KEY constraint failed.
        // The client tried to add a transaction for a non-existent user.
        rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
            Error::UserNotFound
        }
        error => error.into(),
    }
}

impl TransactionStore for SQLiteTransactionStore {
    fn find_by_id(&self, id: TransactionID) -> Result<Option<Transaction>, Error> {
        self.lock()?
            .prepare(
                "SELECT id, amount, description, category, type, date, user_id
                FROM \"transaction\" WHERE id = :id",
            )?
            .query_row(&[(":id", &id.as_i64())], Self::map_row)
            .optional()
            .map_err(|error| error.into())
    }

    /// Insert or update `transaction`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UserNotFound] if the transaction has no owner or the owner is not in the database,
    /// - [Error::NotFound] when updating a transaction that is not in the database,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn save(&self, transaction: Transaction) -> Result<Transaction, Error> {
        let user_id = transaction.user_id().ok_or(Error::UserNotFound)?;
        let date = transaction.date().to_offset(UtcOffset::UTC);
        let connection = self.lock()?;

        match transaction.id() {
            None => connection
                .prepare(
                    "INSERT INTO \"transaction\" (amount, description, category, type, date, user_id)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    RETURNING id, amount, description, category, type, date, user_id",
                )?
                .query_row(
                    (
                        transaction.amount(),
                        transaction.description(),
                        transaction.category(),
                        transaction.transaction_type().as_str(),
                        date,
                        user_id.as_i64(),
                    ),
                    Self::map_row,
                )
                .map_err(map_foreign_key_error),
            Some(id) => connection
                .prepare(
                    "UPDATE \"transaction\"
                    SET amount = ?1, description = ?2, category = ?3, type = ?4, date = ?5, user_id = ?6
                    WHERE id = ?7
                    RETURNING id, amount, description, category, type, date, user_id",
                )?
                .query_row(
                    (
                        transaction.amount(),
                        transaction.description(),
                        transaction.category(),
                        transaction.transaction_type().as_str(),
                        date,
                        user_id.as_i64(),
                        id.as_i64(),
                    ),
                    Self::map_row,
                )
                .map_err(map_foreign_key_error),
        }
    }

    fn find_by_user(&self, user: &User) -> Result<Vec<Transaction>, Error> {
        self.query_by_user(
            user,
            "SELECT id, amount, description, category, type, date, user_id
            FROM \"transaction\" WHERE user_id = ?1",
        )
    }

    fn find_by_user_order_by_date_desc(&self, user: &User) -> Result<Vec<Transaction>, Error> {
        self.query_by_user(
            user,
            "SELECT id, amount, description, category, type, date, user_id
            FROM \"transaction\" WHERE user_id = ?1
            ORDER BY date DESC, id DESC",
        )
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                    id INTEGER PRIMARY KEY,
                    amount REAL NOT NULL,
                    description TEXT NOT NULL,
                    category TEXT NOT NULL,
                    type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                    date TEXT NOT NULL,
                    user_id INTEGER NOT NULL,
                    FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                    )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, date)",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = TransactionID::new(row.get(offset)?);
        let amount = row.get(offset + 1)?;
        let description = row.get(offset + 2)?;
        let category = row.get(offset + 3)?;
        let raw_type: String = row.get(offset + 4)?;
        let date: OffsetDateTime = row.get(offset + 5)?;
        let user_id = UserID::new(row.get(offset + 6)?);

        let transaction_type = TransactionType::from_str(&raw_type).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(offset + 4, Type::Text, Box::new(error))
        })?;

        Ok(Transaction::new_unchecked(
            id,
            amount,
            description,
            category,
            transaction_type,
            date,
            user_id,
        ))
    }
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Duration, macros::datetime};

    use crate::{
        Error, PasswordHash,
        db::initialize,
        stores::{SQLiteUserStore, UserStore},
        transaction::{Transaction, TransactionID, TransactionType},
        user::{User, UserID},
    };

    use super::{SQLiteTransactionStore, TransactionStore};

    fn get_stores() -> (SQLiteUserStore, SQLiteTransactionStore) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        (
            SQLiteUserStore::new(conn.clone()),
            SQLiteTransactionStore::new(conn),
        )
    }

    fn create_user(store: &SQLiteUserStore, email: &str) -> User {
        let mut user = User::new(email, "Hunter2!x", "Test User").unwrap();
        user.set_password(PasswordHash::new_unchecked("hunter2hash"));
        store.save(user).unwrap()
    }

    #[test]
    fn save_new_transaction_assigns_id_and_keeps_fields() {
        let (user_store, store) = get_stores();
        let user = create_user(&user_store, "a@b.com");
        let mut transaction =
            Transaction::new(50.0, "Groceries", "Food", TransactionType::Expense, &user).unwrap();
        transaction.set_date(datetime!(2025-03-01 12:30 UTC));

        let saved = store.save(transaction.clone()).unwrap();

        assert!(saved.id().is_some());
        assert_eq!(saved.amount(), -50.0);
        assert_eq!(saved.description(), "Groceries");
        assert_eq!(saved.category(), "Food");
        assert_eq!(saved.transaction_type(), TransactionType::Expense);
        assert_eq!(saved.date(), datetime!(2025-03-01 12:30 UTC));
        assert_eq!(saved.user_id(), user.id());
    }

    #[test]
    fn save_keeps_instant_for_non_utc_dates() {
        let (user_store, store) = get_stores();
        let user = create_user(&user_store, "a@b.com");
        let mut transaction =
            Transaction::new(10.0, "Pay", "Work", TransactionType::Income, &user).unwrap();
        transaction.set_date(datetime!(2025-03-01 12:30 +13));

        let saved = store.save(transaction).unwrap();

        assert_eq!(saved.date(), datetime!(2025-02-28 23:30 UTC));
    }

    #[test]
    fn save_fails_for_missing_owner() {
        let (_, store) = get_stores();
        let ghost = User::new_unchecked(
            UserID::new(42),
            "ghost@b.com".to_owned(),
            PasswordHash::new_unchecked("hash"),
            "Ghost".to_owned(),
        );
        let transaction =
            Transaction::new(10.0, "Pay", "Work", TransactionType::Income, &ghost).unwrap();

        assert_eq!(store.save(transaction), Err(Error::UserNotFound));
    }

    #[test]
    fn save_fails_for_transaction_without_owner() {
        let (_, store) = get_stores();
        let unsaved_user = User::new("a@b.com", "Hunter2!x", "Ann").unwrap();
        let transaction =
            Transaction::new(10.0, "Pay", "Work", TransactionType::Income, &unsaved_user).unwrap();

        assert_eq!(store.save(transaction), Err(Error::UserNotFound));
    }

    #[test]
    fn save_existing_transaction_updates_row() {
        let (user_store, store) = get_stores();
        let user = create_user(&user_store, "a@b.com");
        let mut saved = store
            .save(Transaction::new(10.0, "Pay", "Work", TransactionType::Income, &user).unwrap())
            .unwrap();

        saved.set_date(datetime!(2024-12-25 08:00 UTC));
        let updated = store.save(saved.clone()).unwrap();

        assert_eq!(updated, saved);
        assert_eq!(store.find_by_id(saved.id().unwrap()), Ok(Some(saved)));
    }

    #[test]
    fn find_by_id_returns_none_for_missing_transaction() {
        let (_, store) = get_stores();

        assert_eq!(store.find_by_id(TransactionID::new(7)), Ok(None));
    }

    #[test]
    fn find_by_user_only_returns_users_transactions() {
        let (user_store, store) = get_stores();
        let user = create_user(&user_store, "a@b.com");
        let other_user = create_user(&user_store, "c@d.com");
        let want = store
            .save(Transaction::new(10.0, "Pay", "Work", TransactionType::Income, &user).unwrap())
            .unwrap();
        store
            .save(
                Transaction::new(5.0, "Coffee", "Food", TransactionType::Expense, &other_user)
                    .unwrap(),
            )
            .unwrap();

        let got = store.find_by_user(&user).unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn find_by_user_returns_empty_for_unsaved_user() {
        let (_, store) = get_stores();
        let unsaved_user = User::new("a@b.com", "Hunter2!x", "Ann").unwrap();

        assert_eq!(store.find_by_user(&unsaved_user), Ok(vec![]));
    }

    #[test]
    fn find_by_user_order_by_date_desc_returns_newest_first() {
        let (user_store, store) = get_stores();
        let user = create_user(&user_store, "a@b.com");
        let base_date = datetime!(2025-01-01 00:00 UTC);
        let mut want = Vec::new();

        for days in [2, 0, 1] {
            let mut transaction =
                Transaction::new(1.0, "Pay", "Work", TransactionType::Income, &user).unwrap();
            transaction.set_date(base_date + Duration::days(days));
            want.push(store.save(transaction).unwrap());
        }
        want.sort_by(|a, b| b.date().cmp(&a.date()));

        let got = store.find_by_user_order_by_date_desc(&user).unwrap();

        assert_eq!(got, want);
    }
}
