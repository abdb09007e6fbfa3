//! Recording transactions and summarising them.

use crate::{Error, stores::TransactionStore, transaction::Transaction, user::User};

/// The totals over all of a user's transactions.
///
/// Computed on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialSummary {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of the absolute amounts of all expenses.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub balance: f64,
}

impl FinancialSummary {
    /// Create a summary, deriving the balance from the two totals.
    pub fn new(total_income: f64, total_expenses: f64) -> Self {
        Self {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
        }
    }
}

/// Adds transactions for users and reports on them.
#[derive(Debug, Clone)]
pub struct TransactionUseCase<S>
where
    S: TransactionStore,
{
    transaction_store: S,
}

impl<S> TransactionUseCase<S>
where
    S: TransactionStore,
{
    /// Create a transaction use case backed by `transaction_store`.
    pub fn new(transaction_store: S) -> Self {
        Self { transaction_store }
    }

    /// Store `transaction` as belonging to `user`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if `transaction` was built without an
    /// owner, already has an ID or if `user` has not been registered,
    /// otherwise any error from the store.
    pub fn add_transaction(
        &self,
        user: &User,
        mut transaction: Transaction,
    ) -> Result<Transaction, Error> {
        if transaction.user_id().is_none() {
            return Err(Error::Validation("Transaction must have a user".to_owned()));
        }

        if transaction.id().is_some() {
            return Err(Error::Validation(
                "Transaction has already been added".to_owned(),
            ));
        }

        if user.id().is_none() {
            return Err(Error::Validation(
                "User must be registered before adding transactions".to_owned(),
            ));
        }

        transaction.set_user(user);

        self.transaction_store.save(transaction)
    }

    /// Total up `user`'s income and expenses.
    ///
    /// A user with no transactions gets a summary of all zeros.
    pub fn get_financial_summary(&self, user: &User) -> Result<FinancialSummary, Error> {
        let transactions = self.transaction_store.find_by_user(user)?;

        let total_income = transactions
            .iter()
            .filter(|transaction| transaction.is_income())
            .map(Transaction::amount)
            .sum();
        let total_expenses = transactions
            .iter()
            .filter(|transaction| transaction.is_expense())
            .map(Transaction::absolute_amount)
            .sum();

        Ok(FinancialSummary::new(total_income, total_expenses))
    }

    /// Get all of `user`'s transactions in no particular order.
    pub fn get_user_transactions(&self, user: &User) -> Result<Vec<Transaction>, Error> {
        self.transaction_store.find_by_user(user)
    }

    /// Get all of `user`'s transactions, newest first.
    pub fn get_recent_transactions(&self, user: &User) -> Result<Vec<Transaction>, Error> {
        self.transaction_store.find_by_user_order_by_date_desc(user)
    }
}

#[cfg(test)]
mod transaction_use_case_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Duration, macros::datetime};

    use crate::{
        Error, PasswordHash,
        db::initialize,
        stores::{SQLiteTransactionStore, SQLiteUserStore, UserStore},
        transaction::{Transaction, TransactionType},
        user::{User, UserID},
    };

    use super::{FinancialSummary, TransactionUseCase};

    fn get_use_case_and_user() -> (TransactionUseCase<SQLiteTransactionStore>, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        let mut user = User::new("a@b.com", "Secret1!", "Ann").unwrap();
        user.set_password(PasswordHash::new_unchecked("hash"));
        let user = SQLiteUserStore::new(connection.clone()).save(user).unwrap();

        (
            TransactionUseCase::new(SQLiteTransactionStore::new(connection)),
            user,
        )
    }

    fn add(
        use_case: &TransactionUseCase<SQLiteTransactionStore>,
        user: &User,
        amount: f64,
        transaction_type: TransactionType,
    ) -> Transaction {
        let transaction =
            Transaction::new(amount, "Something", "Misc", transaction_type, user).unwrap();

        use_case.add_transaction(user, transaction).unwrap()
    }

    #[test]
    fn summary_income_and_expense() {
        let (use_case, user) = get_use_case_and_user();
        add(&use_case, &user, 100.0, TransactionType::Income);
        add(&use_case, &user, 50.0, TransactionType::Expense);

        let summary = use_case.get_financial_summary(&user).unwrap();

        assert_eq!(summary, FinancialSummary::new(100.0, 50.0));
        assert_eq!(summary.balance, 50.0);
    }

    #[test]
    fn summary_with_no_transactions_is_zero() {
        let (use_case, user) = get_use_case_and_user();

        let summary = use_case.get_financial_summary(&user).unwrap();

        assert_eq!(
            summary,
            FinancialSummary {
                total_income: 0.0,
                total_expenses: 0.0,
                balance: 0.0
            }
        );
    }

    #[test]
    fn summary_can_have_negative_balance() {
        let (use_case, user) = get_use_case_and_user();
        add(&use_case, &user, 20.0, TransactionType::Income);
        add(&use_case, &user, -30.0, TransactionType::Expense);
        add(&use_case, &user, 15.5, TransactionType::Expense);

        let summary = use_case.get_financial_summary(&user).unwrap();

        assert_eq!(summary.total_income, 20.0);
        assert_eq!(summary.total_expenses, 45.5);
        assert_eq!(summary.balance, -25.5);
    }

    #[test]
    fn add_transaction_returns_stored_transaction() {
        let (use_case, user) = get_use_case_and_user();

        let transaction = add(&use_case, &user, 50.0, TransactionType::Expense);

        assert!(transaction.id().is_some());
        assert_eq!(transaction.amount(), -50.0);
        assert_eq!(transaction.user_id(), user.id());
    }

    #[test]
    fn add_transaction_assigns_given_user() {
        let (use_case, user) = get_use_case_and_user();
        let placeholder_owner = User::new_unchecked(
            UserID::new(999),
            "x@y.com".to_owned(),
            PasswordHash::new_unchecked("hash"),
            "X".to_owned(),
        );
        let transaction = Transaction::new(
            10.0,
            "Pay",
            "Work",
            TransactionType::Income,
            &placeholder_owner,
        )
        .unwrap();

        let stored = use_case.add_transaction(&user, transaction).unwrap();

        assert_eq!(stored.user_id(), user.id());
    }

    #[test]
    fn add_transaction_fails_without_owner() {
        let (use_case, user) = get_use_case_and_user();
        let unsaved_user = User::new("c@d.com", "Secret1!", "Bob").unwrap();
        let transaction =
            Transaction::new(10.0, "Pay", "Work", TransactionType::Income, &unsaved_user)
                .unwrap();

        assert_eq!(
            use_case.add_transaction(&user, transaction),
            Err(Error::Validation("Transaction must have a user".to_owned()))
        );
    }

    #[test]
    fn add_transaction_fails_for_stored_transaction() {
        let (use_case, user) = get_use_case_and_user();
        let stored = add(&use_case, &user, 10.0, TransactionType::Income);
        let mut changed =
            Transaction::new(1.0, "Changed", "Misc", TransactionType::Expense, &user).unwrap();
        changed.set_id(stored.id().unwrap());

        assert_eq!(
            use_case.add_transaction(&user, changed),
            Err(Error::Validation(
                "Transaction has already been added".to_owned()
            ))
        );
        assert_eq!(use_case.get_user_transactions(&user).unwrap(), vec![stored]);
    }

    #[test]
    fn add_transaction_fails_for_unregistered_user() {
        let (use_case, user) = get_use_case_and_user();
        let unsaved_user = User::new("c@d.com", "Secret1!", "Bob").unwrap();
        let transaction =
            Transaction::new(10.0, "Pay", "Work", TransactionType::Income, &user).unwrap();

        assert_eq!(
            use_case.add_transaction(&unsaved_user, transaction),
            Err(Error::Validation(
                "User must be registered before adding transactions".to_owned()
            ))
        );
    }

    #[test]
    fn recent_transactions_are_newest_first() {
        let (use_case, user) = get_use_case_and_user();
        let start = datetime!(2025-06-01 00:00 UTC);
        let mut want = Vec::new();

        for days in [3, 1, 2] {
            let mut transaction =
                Transaction::new(1.0, "Pay", "Work", TransactionType::Income, &user).unwrap();
            transaction.set_date(start + Duration::days(days));
            want.push(use_case.add_transaction(&user, transaction).unwrap());
        }
        want.sort_by(|a, b| b.date().cmp(&a.date()));

        assert_eq!(use_case.get_recent_transactions(&user).unwrap(), want);
        assert_eq!(use_case.get_user_transactions(&user).unwrap().len(), 3);
    }
}
