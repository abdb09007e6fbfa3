//! Authentication: the log-in, log-out and registration pages, the private
//! auth cookie and the middleware guarding the protected routes.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod register_user;
mod token;

pub(crate) use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub(crate) use redirect::normalize_redirect_url;
pub use register_user::{get_register_page, register_user};
pub(crate) use token::Token;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;

#[cfg(test)]
pub(crate) use middleware::AuthState;
