//! The application services that sit between the web handlers and the stores.

mod transaction;
mod user;

pub use transaction::{FinancialSummary, TransactionUseCase};
pub use user::UserUseCase;

pub(crate) use user::EMAIL_ALREADY_REGISTERED;
