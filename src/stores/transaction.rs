//! Defines the transaction store trait.

use crate::{
    Error,
    transaction::{Transaction, TransactionID},
    user::User,
};

/// Handles the storage and retrieval of [Transaction] objects.
pub trait TransactionStore {
    /// Get the transaction with the given ID, or `None` if no such transaction exists.
    fn find_by_id(&self, id: TransactionID) -> Result<Option<Transaction>, Error>;

    /// Insert `transaction` if it has no ID, otherwise update the stored
    /// transaction with the same ID.
    ///
    /// Returns the stored transaction, which always has an ID.
    fn save(&self, transaction: Transaction) -> Result<Transaction, Error>;

    /// Get all of `user`'s transactions in no particular order.
    fn find_by_user(&self, user: &User) -> Result<Vec<Transaction>, Error>;

    /// Get all of `user`'s transactions, newest first.
    fn find_by_user_order_by_date_desc(&self, user: &User) -> Result<Vec<Transaction>, Error>;
}
