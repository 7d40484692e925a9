//! Page handlers
//!
//! Handlers run after the auth gate and receive the resolved principal. They
//! return either a response or an [`HttpError`] for the transport to render.

use crate::app::App;
use crate::error::HttpError;
use crate::render::View;
use crate::response::{
    cleared_session_cookie, html, json, local_redirect_target, see_other, session_cookie,
    with_cookie, Body,
};
use crate::routes::Page;
use bytes::Bytes;
use hyper::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tollgate_core::{Principal, Token};
use tollgate_store::{StoreError, UserRecord};
use tracing::{debug, info};

const UNKNOWN_USER: &str = "The username you entered does not exist!";
const WRONG_PASSWORD: &str = "The password you entered was invalid!";
const USERNAME_TAKEN: &str = "That username is already taken!";
const INVALID_SIGNUP: &str = "Please choose a username without control characters and a non-empty password.";

/// What a page handler gets to see of the request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub query: Option<String>,
    pub principal: Principal,
    /// Raw `auth_token` cookie value
    pub cookie: Option<String>,
    pub body: Bytes,
}

#[derive(Debug, Default, Deserialize)]
struct ReturnQuery {
    #[serde(rename = "return")]
    return_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
    #[serde(rename = "return")]
    return_to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SignupForm {
    username: String,
    password: String,
    email: String,
    firstname: String,
    lastname: String,
    #[serde(rename = "dob-year")]
    dob_year: String,
    #[serde(rename = "dob-month")]
    dob_month: String,
    #[serde(rename = "dob-day")]
    dob_day: String,
}

/// Run the handler for `page`
pub async fn handle(app: &App, page: Page, ctx: RequestContext) -> Result<Response<Body>, HttpError> {
    match page {
        Page::Home => home(app, &ctx),
        Page::Login => login(app, &ctx).await,
        Page::Signup => signup(app, &ctx).await,
        Page::MyAccount => my_account(app, &ctx),
        Page::Logout => logout(app, &ctx),
        Page::Health => health(&ctx),
    }
}

fn render(app: &App, principal: &Principal, view: &View<'_>) -> Result<Response<Body>, HttpError> {
    let body = app
        .renderer
        .render(principal, view)
        .map_err(HttpError::internal)?;
    Ok(html(StatusCode::OK, body))
}

fn is_read(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

fn parse_form<T: DeserializeOwned>(body: &Bytes) -> Result<T, HttpError> {
    serde_urlencoded::from_bytes(body).map_err(HttpError::bad_request)
}

fn query_return(ctx: &RequestContext) -> Option<String> {
    let query = ctx.query.as_deref().unwrap_or_default();
    serde_urlencoded::from_str::<ReturnQuery>(query)
        .unwrap_or_default()
        .return_to
}

async fn hash_password(app: &App, password: String) -> Result<String, HttpError> {
    let hasher = app.hasher.clone();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(HttpError::internal)?
        .map_err(HttpError::internal)
}

async fn password_matches(app: &App, digest: String, password: String) -> Result<bool, HttpError> {
    let hasher = app.hasher.clone();
    tokio::task::spawn_blocking(move || hasher.compare(&digest, &password))
        .await
        .map_err(HttpError::internal)
}

/// Issue a session for `username` and redirect to `target` with the cookie set
fn start_session(app: &App, username: &str, target: &str) -> Result<Response<Body>, HttpError> {
    let token = app.sessions.login(username).map_err(HttpError::internal)?;
    with_cookie(see_other(target)?, &session_cookie(&token))
}

fn home(app: &App, ctx: &RequestContext) -> Result<Response<Body>, HttpError> {
    if !is_read(&ctx.method) {
        return Err(HttpError::method_not_allowed());
    }
    render(app, &ctx.principal, &View::Home)
}

async fn login(app: &App, ctx: &RequestContext) -> Result<Response<Body>, HttpError> {
    let query_return = query_return(ctx);

    if is_read(&ctx.method) {
        return render(
            app,
            &ctx.principal,
            &View::Login {
                error: None,
                return_to: query_return.as_deref(),
            },
        );
    }
    if ctx.method != Method::POST {
        return Err(HttpError::method_not_allowed());
    }

    let form: LoginForm = parse_form(&ctx.body)?;
    let return_to = form.return_to.or(query_return);
    let failed = |error| {
        render(
            app,
            &ctx.principal,
            &View::Login {
                error: Some(error),
                return_to: return_to.as_deref(),
            },
        )
    };

    let digest = app
        .users
        .lookup_password_hash(&form.username)
        .map_err(HttpError::internal)?;

    let Some(digest) = digest else {
        debug!(username = %form.username, "login for unknown user");
        return failed(UNKNOWN_USER);
    };

    if !password_matches(app, digest, form.password).await? {
        debug!(username = %form.username, "login with wrong password");
        return failed(WRONG_PASSWORD);
    }

    info!(username = %form.username, "user logged in");
    start_session(app, &form.username, local_redirect_target(return_to.as_deref()))
}

async fn signup(app: &App, ctx: &RequestContext) -> Result<Response<Body>, HttpError> {
    if is_read(&ctx.method) {
        return render(app, &ctx.principal, &View::Signup { error: None });
    }
    if ctx.method != Method::POST {
        return Err(HttpError::method_not_allowed());
    }

    let form: SignupForm = parse_form(&ctx.body)?;
    let failed = |error| render(app, &ctx.principal, &View::Signup { error: Some(error) });

    if form.password.is_empty() {
        return failed(INVALID_SIGNUP);
    }

    // Cheap check before paying for a hash; insert_user stays authoritative.
    if app
        .users
        .lookup_password_hash(&form.username)
        .map_err(HttpError::internal)?
        .is_some()
    {
        return failed(USERNAME_TAKEN);
    }

    let digest = hash_password(app, form.password).await?;
    let record = UserRecord::new(form.username, digest)
        .with_email(form.email)
        .with_name(form.firstname, form.lastname)
        .with_date_of_birth(format!("{}-{}-{}", form.dob_year, form.dob_month, form.dob_day));

    match app.users.insert_user(&record) {
        Ok(()) => {}
        Err(StoreError::DuplicateUsername(_)) => return failed(USERNAME_TAKEN),
        Err(StoreError::InvalidRecord(reason)) => {
            debug!(%reason, "rejected signup");
            return failed(INVALID_SIGNUP);
        }
        Err(err) => return Err(HttpError::internal(err)),
    }

    info!(username = %record.username, "user signed up");
    start_session(app, &record.username, "/")
}

fn my_account(app: &App, ctx: &RequestContext) -> Result<Response<Body>, HttpError> {
    if !is_read(&ctx.method) {
        return Err(HttpError::method_not_allowed());
    }
    render(app, &ctx.principal, &View::MyAccount)
}

fn logout(app: &App, ctx: &RequestContext) -> Result<Response<Body>, HttpError> {
    if let Some(token) = ctx.cookie.as_deref().and_then(|value| Token::decode(value).ok()) {
        app.sessions.logout(&token).map_err(HttpError::internal)?;
        info!(username = %token.username, "user logged out");
    }

    with_cookie(see_other("/")?, &cleared_session_cookie())
}

fn health(ctx: &RequestContext) -> Result<Response<Body>, HttpError> {
    if !is_read(&ctx.method) {
        return Err(HttpError::method_not_allowed());
    }
    Ok(json(
        StatusCode::OK,
        &json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "service": "tollgate"
        }),
    ))
}
