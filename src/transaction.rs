//! The transaction domain model.
//!
//! A transaction records a single income or expense event for a user. The sign
//! of the amount always agrees with the transaction type: expenses are stored
//! as negative amounts and income as positive amounts, whatever sign the
//! caller supplied.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    user::{User, UserID},
};

/// The maximum number of characters in a transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// The maximum number of characters in a transaction category.
pub const MAX_CATEGORY_LENGTH: usize = 50;

/// A newtype wrapper for integer transaction IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TransactionID(i64);

impl TransactionID {
    /// Create a new transaction ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the transaction ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for TransactionID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether money came in or went out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl TransactionType {
    /// The name used in forms and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            other => Err(Error::Validation(format!(
                "Invalid transaction type: {other}"
            ))),
        }
    }
}

/// An income or expense event owned by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: Option<TransactionID>,
    amount: f64,
    description: String,
    category: String,
    transaction_type: TransactionType,
    date: OffsetDateTime,
    user_id: Option<UserID>,
}

impl Transaction {
    /// Create a new transaction for `user` dated now.
    ///
    /// The sign of `amount` is normalised to match `transaction_type`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the amount is zero or not a finite
    /// number, or if the description or category is blank or too long.
    pub fn new(
        amount: f64,
        description: &str,
        category: &str,
        transaction_type: TransactionType,
        user: &User,
    ) -> Result<Self, Error> {
        if !amount.is_finite() {
            return Err(Error::Validation(
                "Transaction amount must be a finite number".to_owned(),
            ));
        }

        if amount == 0.0 {
            return Err(Error::Validation(
                "Transaction amount cannot be zero".to_owned(),
            ));
        }

        if description.trim().is_empty() {
            return Err(Error::Validation(
                "Transaction description cannot be empty".to_owned(),
            ));
        }

        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(Error::Validation(format!(
                "Transaction description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }

        if category.trim().is_empty() {
            return Err(Error::Validation(
                "Transaction category cannot be empty".to_owned(),
            ));
        }

        if category.chars().count() > MAX_CATEGORY_LENGTH {
            return Err(Error::Validation(format!(
                "Transaction category cannot exceed {MAX_CATEGORY_LENGTH} characters"
            )));
        }

        Ok(Self {
            id: None,
            amount: normalise_amount(amount, transaction_type),
            description: description.to_owned(),
            category: category.to_owned(),
            transaction_type,
            date: OffsetDateTime::now_utc(),
            user_id: user.id(),
        })
    }

    /// Create a transaction without any validation.
    ///
    /// Intended for rows read back from the database. The amount is still
    /// normalised so that a stored transaction can never break the sign rule.
    pub fn new_unchecked(
        id: TransactionID,
        amount: f64,
        description: String,
        category: String,
        transaction_type: TransactionType,
        date: OffsetDateTime,
        user_id: UserID,
    ) -> Self {
        Self {
            id: Some(id),
            amount: normalise_amount(amount, transaction_type),
            description,
            category,
            transaction_type,
            date,
            user_id: Some(user_id),
        }
    }

    /// The transaction's ID, or `None` if it has not been saved yet.
    pub fn id(&self) -> Option<TransactionID> {
        self.id
    }

    /// The signed amount: negative for expenses, positive for income.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The amount without its sign.
    pub fn absolute_amount(&self) -> f64 {
        self.amount.abs()
    }

    /// What the money was for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The group the transaction falls under.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether the transaction is income or an expense.
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// When the transaction happened.
    pub fn date(&self) -> OffsetDateTime {
        self.date
    }

    /// The ID of the user that owns the transaction.
    pub fn user_id(&self) -> Option<UserID> {
        self.user_id
    }

    /// Whether the transaction is income.
    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    /// Whether the transaction is an expense.
    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    /// Set the ID assigned by the transaction store.
    pub fn set_id(&mut self, id: TransactionID) {
        self.id = Some(id);
    }

    /// Override the date, which defaults to when the transaction was created.
    pub fn set_date(&mut self, date: OffsetDateTime) {
        self.date = date;
    }

    /// Make `user` the owner of the transaction.
    pub fn set_user(&mut self, user: &User) {
        self.user_id = user.id();
    }
}

fn normalise_amount(amount: f64, transaction_type: TransactionType) -> f64 {
    match transaction_type {
        TransactionType::Expense => -amount.abs(),
        TransactionType::Income => amount.abs(),
    }
}

#[cfg(test)]
mod transaction_tests {
    use std::str::FromStr;

    use time::macros::datetime;

    use crate::{
        Error, PasswordHash,
        user::{User, UserID},
    };

    use super::{Transaction, TransactionType};

    fn test_user() -> User {
        User::new_unchecked(
            UserID::new(1),
            "a@b.com".to_owned(),
            PasswordHash::new_unchecked("hunter2"),
            "Ann".to_owned(),
        )
    }

    #[track_caller]
    fn assert_validation_error(result: Result<Transaction, Error>, want_message: &str) {
        assert_eq!(
            result,
            Err(Error::Validation(want_message.to_owned())),
            "want validation error \"{want_message}\""
        );
    }

    #[test]
    fn expense_amount_is_stored_negative() {
        let user = test_user();

        for amount in [50.0, -50.0] {
            let transaction =
                Transaction::new(amount, "Groceries", "Food", TransactionType::Expense, &user)
                    .unwrap();

            assert_eq!(transaction.amount(), -50.0);
            assert_eq!(transaction.absolute_amount(), 50.0);
        }
    }

    #[test]
    fn income_amount_is_stored_positive() {
        let user = test_user();

        for amount in [100.0, -100.0] {
            let transaction =
                Transaction::new(amount, "Salary", "Work", TransactionType::Income, &user)
                    .unwrap();

            assert_eq!(transaction.amount(), 100.0);
        }
    }

    #[test]
    fn new_transaction_takes_owner_and_current_date() {
        let user = test_user();

        let transaction =
            Transaction::new(12.5, "Lunch", "Food", TransactionType::Expense, &user).unwrap();

        assert_eq!(transaction.id(), None);
        assert_eq!(transaction.user_id(), Some(UserID::new(1)));
        assert!(
            (time::OffsetDateTime::now_utc() - transaction.date()).abs() < time::Duration::seconds(5),
            "want date close to now, got {}",
            transaction.date()
        );
    }

    #[test]
    fn new_transaction_fails_on_zero_amount() {
        assert_validation_error(
            Transaction::new(0.0, "Nothing", "Misc", TransactionType::Income, &test_user()),
            "Transaction amount cannot be zero",
        );
    }

    #[test]
    fn new_transaction_fails_on_non_finite_amount() {
        assert_validation_error(
            Transaction::new(f64::NAN, "Nothing", "Misc", TransactionType::Income, &test_user()),
            "Transaction amount must be a finite number",
        );
    }

    #[test]
    fn new_transaction_fails_on_blank_description() {
        assert_validation_error(
            Transaction::new(1.0, "   ", "Misc", TransactionType::Income, &test_user()),
            "Transaction description cannot be empty",
        );
    }

    #[test]
    fn description_length_boundary() {
        let user = test_user();
        let longest = "d".repeat(255);
        assert!(Transaction::new(1.0, &longest, "Misc", TransactionType::Income, &user).is_ok());

        let too_long = "d".repeat(256);
        assert_validation_error(
            Transaction::new(1.0, &too_long, "Misc", TransactionType::Income, &user),
            "Transaction description cannot exceed 255 characters",
        );
    }

    #[test]
    fn new_transaction_fails_on_empty_category() {
        assert_validation_error(
            Transaction::new(1.0, "Salary", "", TransactionType::Income, &test_user()),
            "Transaction category cannot be empty",
        );
    }

    #[test]
    fn category_length_boundary() {
        let user = test_user();
        let longest = "c".repeat(50);
        assert!(Transaction::new(1.0, "Salary", &longest, TransactionType::Income, &user).is_ok());

        let too_long = "c".repeat(51);
        assert_validation_error(
            Transaction::new(1.0, "Salary", &too_long, TransactionType::Income, &user),
            "Transaction category cannot exceed 50 characters",
        );
    }

    #[test]
    fn setters_update_fields() {
        let mut transaction =
            Transaction::new(1.0, "Salary", "Work", TransactionType::Income, &test_user())
                .unwrap();
        let other_user = User::new_unchecked(
            UserID::new(2),
            "c@d.com".to_owned(),
            PasswordHash::new_unchecked("hunter3"),
            "Bob".to_owned(),
        );
        let date = datetime!(2025-01-31 09:30 UTC);

        transaction.set_id(super::TransactionID::new(3));
        transaction.set_date(date);
        transaction.set_user(&other_user);

        assert_eq!(transaction.id(), Some(super::TransactionID::new(3)));
        assert_eq!(transaction.date(), date);
        assert_eq!(transaction.user_id(), Some(UserID::new(2)));
    }

    #[test]
    fn transaction_type_round_trips_through_str() {
        for transaction_type in [TransactionType::Income, TransactionType::Expense] {
            let parsed = TransactionType::from_str(transaction_type.as_str()).unwrap();

            assert_eq!(parsed, transaction_type);
        }
    }

    #[test]
    fn transaction_type_rejects_unknown_name() {
        assert!(TransactionType::from_str("income").is_err());
    }
}
