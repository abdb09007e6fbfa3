//! Traits for the objects that store the domain models, and their SQLite implementations.

mod sqlite;
mod transaction;
mod user;

pub use sqlite::{SQLiteTransactionStore, SQLiteUserStore};
pub use transaction::TransactionStore;
pub use user::UserStore;
