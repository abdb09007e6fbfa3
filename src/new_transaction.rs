//! The page and form endpoint for adding a transaction.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of rejecting the form like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error, TransactionDto, UserID,
    app_state::{AppTransactionUseCase, AppUserUseCase},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        dollar_input_styles, loading_spinner,
    },
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{MAX_CATEGORY_LENGTH, MAX_DESCRIPTION_LENGTH, TransactionType},
};

/// The state needed to show the new transaction page and add transactions.
#[derive(Debug, Clone)]
pub struct NewTransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub user_use_case: Arc<AppUserUseCase>,
    pub transaction_use_case: Arc<AppTransactionUseCase>,
}

impl FromRef<AppState> for NewTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            user_use_case: state.user_use_case.clone(),
            transaction_use_case: state.transaction_use_case.clone(),
        }
    }
}

fn transaction_type_radio(transaction_type: TransactionType, label: &str, checked: bool) -> Markup {
    let id = format!("type-{}", transaction_type.as_str().to_lowercase());

    html! {
        div class="flex-1 flex"
        {
            input
                type="radio"
                name="type"
                id=(id)
                value=(transaction_type.as_str())
                required
                checked[checked]
                class=(FORM_RADIO_INPUT_STYLE);

            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (label) }
        }
    }
}

fn new_transaction_view(max_date: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION).into_html();
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::NEW_TRANSACTION)
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Transaction" }

                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Type" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        (transaction_type_radio(TransactionType::Expense, "Expense", true))
                        (transaction_type_radio(TransactionType::Income, "Income", false))
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    // w-full needed to ensure input takes the full width when prefilled with a value
                    div class="input-wrapper w-full"
                    {
                        input
                            name="amount"
                            id="amount"
                            type="number"
                            step="0.01"
                            min="0.01"
                            placeholder="0.00"
                            required
                            autofocus
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        name="description"
                        id="description"
                        type="text"
                        placeholder="Description"
                        required
                        maxlength=(MAX_DESCRIPTION_LENGTH)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    input
                        name="category"
                        id="category"
                        type="text"
                        placeholder="e.g. Groceries"
                        required
                        maxlength=(MAX_CATEGORY_LENGTH)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        max=(max_date)
                        required
                        value=(max_date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="inline htmx-indicator" { (spinner) }
                    " Add Transaction"
                }
            }
        }
    };

    base("Add Transaction", &[dollar_input_styles()], &content)
}

/// Renders the page for adding a transaction.
pub async fn get_new_transaction_page(
    State(state): State<NewTransactionState>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone)
    })?;

    let max_date = OffsetDateTime::now_utc().to_offset(local_offset).date();

    Ok(new_transaction_view(max_date).into_response())
}

/// A route handler for adding a transaction for the logged in user,
/// redirects to the dashboard on success.
///
/// Problems with the submitted fields are returned as an alert for htmx to
/// show in the alert container.
pub async fn create_transaction(
    State(state): State<NewTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionDto>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let user = match state.user_use_case.find_by_id(user_id) {
        Ok(user) => user,
        Err(Error::UserNotFound) => {
            tracing::warn!("Auth cookie for unknown user {user_id}, logging out.");
            return (
                HxRedirect(endpoints::LOG_OUT.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response();
        }
        Err(error) => {
            tracing::error!("Could not get user {user_id}: {error}");
            return error.into_alert_response();
        }
    };

    let transaction = match form.to_domain(&user, local_offset) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::debug!("Rejected new transaction: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = state
        .transaction_use_case
        .add_transaction(&user, transaction)
    {
        tracing::error!("Could not add transaction: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}


#[cfg(test)]
mod create_transaction_tests {
    use axum::{Extension, extract::State, http::StatusCode, response::Response};
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        AppState, TransactionDto, UserID, endpoints,
        test_utils::{
            assert_hx_redirect, get_test_app_state, parse_html_fragment, register_test_user,
        },
        transaction::{Transaction, TransactionType},
        user::User,
    };

    use super::{NewTransactionState, create_transaction};

    fn get_state(state: &AppState) -> NewTransactionState {
        NewTransactionState {
            local_timezone: state.local_timezone.clone(),
            user_use_case: state.user_use_case.clone(),
            transaction_use_case: state.transaction_use_case.clone(),
        }
    }

    fn form(amount: f64, transaction_type: Option<TransactionType>) -> TransactionDto {
        TransactionDto {
            id: None,
            amount,
            description: "Groceries".to_owned(),
            category: "Food".to_owned(),
            transaction_type,
            date: Some(date!(2025 - 01 - 15)),
        }
    }

    async fn post(state: &AppState, user: &User, form: TransactionDto) -> Response {
        create_transaction(
            State(get_state(state)),
            Extension(user.id().unwrap()),
            Form(form),
        )
        .await
    }

    async fn alert_text(response: Response) -> String {
        parse_html_fragment(response)
            .await
            .root_element()
            .text()
            .collect()
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let state = get_test_app_state();
        let user = register_test_user(&state);

        let response = post(&state, &user, form(42.5, Some(TransactionType::Expense))).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);

        let transactions = state
            .transaction_use_case
            .get_user_transactions(&user)
            .unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount(), -42.5);
        assert_eq!(transactions[0].category(), "Food");
        assert_eq!(transactions[0].date().date(), date!(2025 - 01 - 15));
        assert_eq!(transactions[0].user_id(), user.id());
    }

    #[tokio::test]
    async fn submitted_id_does_not_touch_other_users_transaction() {
        let state = get_test_app_state();
        let owner = register_test_user(&state);
        let other_user = state
            .user_use_case
            .register_user("bob@example.com", "Secret1!", "Bob")
            .unwrap();
        let owners_transaction = state
            .transaction_use_case
            .add_transaction(
                &owner,
                Transaction::new(1000.0, "Salary", "Work", TransactionType::Income, &owner)
                    .unwrap(),
            )
            .unwrap();
        let submitted: TransactionDto = serde_urlencoded::from_str(&format!(
            "id={}&amount=1&description=Lunch&category=Food&type=EXPENSE&date=2025-01-01",
            owners_transaction.id().unwrap()
        ))
        .unwrap();

        let response = post(&state, &other_user, submitted).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            state
                .transaction_use_case
                .get_user_transactions(&owner)
                .unwrap(),
            vec![owners_transaction.clone()]
        );
        let other_users_transactions = state
            .transaction_use_case
            .get_user_transactions(&other_user)
            .unwrap();
        assert_eq!(other_users_transactions.len(), 1);
        assert_ne!(other_users_transactions[0].id(), owners_transaction.id());
        assert_eq!(other_users_transactions[0].description(), "Lunch");
    }

    #[tokio::test]
    async fn zero_amount_returns_alert() {
        let state = get_test_app_state();
        let user = register_test_user(&state);

        let response = post(&state, &user, form(0.0, Some(TransactionType::Income))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let text = alert_text(response).await;
        assert!(
            text.contains("Transaction amount cannot be zero"),
            "got alert text {text:?}"
        );
        assert!(
            state
                .transaction_use_case
                .get_user_transactions(&user)
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn missing_type_returns_alert() {
        let state = get_test_app_state();
        let user = register_test_user(&state);

        let response = post(&state, &user, form(10.0, None)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let text = alert_text(response).await;
        assert!(
            text.contains("Transaction type cannot be null"),
            "got alert text {text:?}"
        );
    }

    #[tokio::test]
    async fn unknown_user_is_logged_out() {
        let state = get_test_app_state();

        let response = create_transaction(
            State(get_state(&state)),
            Extension(UserID::new(42)),
            Form(form(10.0, Some(TransactionType::Income))),
        )
        .await;

        assert_hx_redirect(&response, endpoints::LOG_OUT);
    }
}
