//! Response builders and session cookie headers

use crate::error::HttpError;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE, LOCATION, SERVER, SET_COOKIE};
use hyper::{Response, StatusCode};
use tollgate_core::{Token, AUTH_COOKIE};

pub type Body = Full<Bytes>;

const SERVER_NAME: &str = "tollgate/0.1.0";

fn response(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Body> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(SERVER, HeaderValue::from_static(SERVER_NAME));
    response
}

/// HTML document response
pub fn html(status: StatusCode, body: String) -> Response<Body> {
    response(status, "text/html; charset=utf-8", body)
}

/// JSON response
pub fn json(status: StatusCode, body: &serde_json::Value) -> Response<Body> {
    response(status, "application/json", body.to_string())
}

/// Bare status with a plain-text reason, for when rendering itself failed
pub fn plain_status(status: StatusCode) -> Response<Body> {
    response(
        status,
        "text/plain; charset=utf-8",
        status.canonical_reason().unwrap_or("Error").to_string(),
    )
}

/// 303 See Other to `location`
pub fn see_other(location: &str) -> Result<Response<Body>, HttpError> {
    let location = HeaderValue::from_str(location).map_err(HttpError::internal)?;
    let mut response = response(StatusCode::SEE_OTHER, "text/plain; charset=utf-8", "");
    response.headers_mut().insert(LOCATION, location);
    Ok(response)
}

/// `Set-Cookie` value carrying `token`
pub fn session_cookie(token: &Token) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        AUTH_COOKIE,
        token.encode()
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn cleared_session_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", AUTH_COOKIE)
}

/// Attach a `Set-Cookie` header
pub fn with_cookie(mut response: Response<Body>, cookie: &str) -> Result<Response<Body>, HttpError> {
    let value = HeaderValue::from_str(cookie).map_err(HttpError::internal)?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(response)
}

/// Keep only same-site absolute paths as post-login redirect targets
pub fn local_redirect_target(target: Option<&str>) -> &str {
    match target {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}
