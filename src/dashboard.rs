//! The dashboard page with the user's totals and their transactions.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    AppState, Error, FinancialSummary, TransactionDto, UserDto, UserID,
    app_state::{AppTransactionUseCase, AppUserUseCase},
    endpoints,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency, link,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{Transaction, TransactionType},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub user_use_case: Arc<AppUserUseCase>,
    pub transaction_use_case: Arc<AppTransactionUseCase>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            user_use_case: state.user_use_case.clone(),
            transaction_use_case: state.transaction_use_case.clone(),
        }
    }
}

/// Display the logged in user's income, expenses, balance and transactions.
///
/// A valid cookie for a user that no longer exists logs the client out.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let user = match state.user_use_case.find_by_id(user_id) {
        Ok(user) => user,
        Err(Error::UserNotFound) => {
            tracing::warn!("Auth cookie for unknown user {user_id}, logging out.");
            return Ok(Redirect::to(endpoints::LOG_OUT).into_response());
        }
        Err(error) => {
            tracing::error!("Could not get user {user_id}: {error}");
            return Err(error);
        }
    };

    let summary = state
        .transaction_use_case
        .get_financial_summary(&user)
        .inspect_err(|error| tracing::error!("Could not get financial summary: {error}"))?;
    let transactions = state
        .transaction_use_case
        .get_recent_transactions(&user)
        .inspect_err(|error| tracing::error!("Could not get transactions: {error}"))?;

    Ok(dashboard_view(
        &UserDto::from_domain(&user),
        &summary,
        &transactions,
        local_offset,
    )
    .into_response())
}

fn summary_card(id: &str, title: &str, amount: f64, amount_style: &str) -> Markup {
    html! {
        div
            id=(id)
            class="flex-1 bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { (title) }
            p class={ "text-2xl font-bold " (amount_style) } { (format_currency(amount)) }
        }
    }
}

fn summary_cards(summary: &FinancialSummary) -> Markup {
    let balance_style = if summary.balance < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-gray-900 dark:text-white"
    };

    html! {
        section class="w-full flex flex-col md:flex-row gap-4 mb-8"
        {
            (summary_card(
                "total-income",
                "Total Income",
                summary.total_income,
                "text-green-600 dark:text-green-400",
            ))
            (summary_card(
                "total-expenses",
                "Total Expenses",
                summary.total_expenses,
                "text-red-600 dark:text-red-400",
            ))
            (summary_card("balance", "Balance", summary.balance, balance_style))
        }
    }
}

fn transaction_row(transaction: &TransactionDto) -> Markup {
    let amount_style = match transaction.transaction_type {
        Some(TransactionType::Income) => "text-green-600 dark:text-green-400",
        _ => "text-red-600 dark:text-red-400",
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(date) = transaction.date { (date) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (transaction.category) }
            td class={ (TABLE_CELL_STYLE) " text-right " (amount_style) }
            {
                (format_currency(transaction.amount))
            }
        }
    }
}

fn transactions_table(transactions: &[TransactionDto]) -> Markup {
    html! {
        section class="w-full overflow-x-auto shadow-md rounded-lg"
        {
            table id="transactions" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction))
                    }
                }
            }
        }
    }
}

fn no_transactions_view() -> Markup {
    html! {
        section class="text-center"
        {
            h2 class="text-xl font-bold" { "Nothing here yet..." }

            p
            {
                "Your transactions will show up here once you "
                (link(endpoints::NEW_TRANSACTION, "add a transaction"))
                "."
            }
        }
    }
}

fn dashboard_view(
    user: &UserDto,
    summary: &FinancialSummary,
    transactions: &[Transaction],
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let transactions: Vec<TransactionDto> = transactions
        .iter()
        .map(|transaction| TransactionDto::from_domain(transaction, local_offset))
        .collect();

    let content = html! {
        (nav_bar)

        div class={ (PAGE_CONTAINER_STYLE) " max-w-screen-xl" }
        {
            h1 class="text-2xl font-bold mb-6" { "Welcome, " (user.name) }

            (summary_cards(summary))

            @if transactions.is_empty() {
                (no_transactions_view())
            } @else {
                (transactions_table(&transactions))
            }
        }
    };

    base("Dashboard", &[], &content)
}
