//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{StatusCode, header::CONTENT_TYPE, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of bytes of a body that are logged at the `info` level.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values must never reach the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "password_confirmation"];

const REDACTED_VALUE: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level. Password fields in form
/// submissions are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes);

    if is_form_submission(&parts) {
        log_request(&parts, &redact_form_passwords(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_response(&parts, &String::from_utf8_lossy(&body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Result<Bytes, axum::Error> {
    axum::body::to_bytes(body, usize::MAX).await
}

fn is_form_submission(parts: &request::Parts) -> bool {
    parts.method == axum::http::Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Replace the values of password fields in a URL encoded form.
///
/// Bodies that cannot be parsed as a form are returned as is.
fn redact_form_passwords(form_text: &str) -> String {
    let Ok(fields) = serde_urlencoded::from_str::<Vec<(String, String)>>(form_text) else {
        return form_text.to_owned();
    };

    let redacted_fields: Vec<(String, String)> = fields
        .into_iter()
        .map(|(key, value)| {
            if REDACTED_FIELDS.contains(&key.as_str()) {
                (key, REDACTED_VALUE.to_owned())
            } else {
                (key, value)
            }
        })
        .collect();

    serde_urlencoded::to_string(&redacted_fields).unwrap_or_else(|_| form_text.to_owned())
}

/// Get at most [LOG_BODY_LENGTH_LIMIT] bytes of `body` without splitting a character.
fn truncate(body: &str) -> &str {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return body;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(parts: &request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Received request: {parts:#?}\nbody: {}...", truncate(body));
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {body:?}");
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("Sending response: {parts:#?}\nbody: {}...", truncate(body));
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {parts:#?}\nbody: {body:?}");
    }
}
