//! The shapes users and transactions take at the web boundary.
//!
//! Handlers deserialize form data into these types and render pages from
//! them, converting to and from the domain types in one place.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    transaction::{Transaction, TransactionID, TransactionType},
    user::{User, UserID},
};

/// A user without their password.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDto {
    /// The user's ID, `None` for users that have not been saved.
    pub id: Option<UserID>,
    /// The email the user logs in with.
    pub email: String,
    /// The user's display name.
    pub name: String,
}

impl UserDto {
    /// Copy everything but the password from `user`.
    pub fn from_domain(user: &User) -> Self {
        Self {
            id: user.id(),
            email: user.email().to_owned(),
            name: user.name().to_owned(),
        }
    }
}

/// A transaction as it is submitted by the new transaction form and shown on
/// the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDto {
    /// The ID of a stored transaction. Only filled in for display, an ID in
    /// submitted form data is ignored.
    #[serde(skip_deserializing)]
    pub id: Option<TransactionID>,
    /// The amount in dollars. The sign is ignored when converting to a
    /// [Transaction], the type decides it.
    pub amount: f64,
    /// What the money was for.
    pub description: String,
    /// The group the transaction falls under, e.g. "Food".
    pub category: String,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type", default)]
    pub transaction_type: Option<TransactionType>,
    /// The local date of the transaction, defaults to today.
    #[serde(default)]
    pub date: Option<Date>,
}

impl TransactionDto {
    /// Create a DTO from `transaction` with the date in the local timezone.
    pub fn from_domain(transaction: &Transaction, local_offset: UtcOffset) -> Self {
        Self {
            id: transaction.id(),
            amount: transaction.amount(),
            description: transaction.description().to_owned(),
            category: transaction.category().to_owned(),
            transaction_type: Some(transaction.transaction_type()),
            date: Some(transaction.date().to_offset(local_offset).date()),
        }
    }

    /// Build a validated transaction owned by `user`.
    ///
    /// A date given in the DTO keeps the current local time of day so that
    /// transactions added on the same day stay in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the type is missing or if
    /// [Transaction::new] rejects the other fields.
    pub fn to_domain(&self, user: &User, local_offset: UtcOffset) -> Result<Transaction, Error> {
        let transaction_type = self
            .transaction_type
            .ok_or_else(|| Error::Validation("Transaction type cannot be null".to_owned()))?;

        let mut transaction = Transaction::new(
            self.amount,
            &self.description,
            &self.category,
            transaction_type,
            user,
        )?;

        if let Some(date) = self.date {
            let now = OffsetDateTime::now_utc().to_offset(local_offset);
            transaction.set_date(now.replace_date(date));
        }

        Ok(transaction)
    }
}
