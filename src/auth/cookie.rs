//! Reading and writing the private auth cookie.
//!
//! The cookie holds a JSON encoded [Token] and is encrypted and signed by the
//! [PrivateCookieJar], so the client can neither read nor forge it.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::{Error, UserID, auth::Token};

pub(crate) const COOKIE_TOKEN: &str = "token";

/// The default duration for which auth cookies are valid.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// Add an auth cookie to the cookie jar, indicating that a user is logged in and authenticated.
///
/// The token expires `duration` from now, with the expiry written in the
/// local timezone given by `local_offset`.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the token cannot be serialized.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc().to_offset(local_offset) + duration;

    set_auth_cookie_with_expiry(jar, Token { user_id, expires_at })
}

fn set_auth_cookie_with_expiry(jar: PrivateCookieJar, token: Token) -> Result<PrivateCookieJar, Error> {
    let token_string = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .expires(token.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the auth cookie to an invalid value and set its max age to zero, which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the token from the auth cookie in `jar`.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no auth cookie,
/// - [Error::JSONSerializationError] if the cookie does not hold a token,
/// - [Error::TokenExpired] if the token has expired.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;

    let token: Token = serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    if token.is_expired_at(OffsetDateTime::now_utc()) {
        return Err(Error::TokenExpired);
    }

    Ok(token)
}

/// Push the expiry of the auth cookie in `jar` out to `duration` from now,
/// unless it already expires later than that.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned. See
/// [get_token_from_cookies] and [set_auth_cookie] for the possible errors.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
    local_offset: UtcOffset,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;
    let new_expiry = OffsetDateTime::now_utc().to_offset(local_offset) + duration;

    if new_expiry <= token.expires_at {
        return Ok(jar);
    }

    set_auth_cookie_with_expiry(
        jar,
        Token {
            user_id: token.user_id,
            expires_at: new_expiry,
        },
    )
}
