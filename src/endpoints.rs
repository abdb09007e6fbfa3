//! The URIs of the app's pages and form endpoints.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The page and form endpoint for registering a new user.
pub const REGISTER: &str = "/register";
/// The page and form endpoint for logging in.
pub const LOG_IN: &str = "/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/logout";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page and form endpoint for adding a transaction.
pub const NEW_TRANSACTION: &str = "/dashboard/add";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";
