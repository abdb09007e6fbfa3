//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    new_transaction::{create_transaction, get_new_transaction_page},
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(
            endpoints::LOG_IN,
            get(get_log_in_page).post(post_log_in),
        )
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::REGISTER,
            get(get_register_page).post(register_user),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::NEW_TRANSACTION, get(get_new_transaction_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // Form submissions need the HX-Redirect header for auth redirects to work with htmx.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::NEW_TRANSACTION, post(create_transaction))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
