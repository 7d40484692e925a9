//! HTTP request entry point

use crate::app::App;
use crate::dispatcher::{auth_cookie, dispatch, Control, Verdict};
use crate::error::HttpError;
use crate::pages::{self, RequestContext};
use crate::render::View;
use crate::response::{html, plain_status, see_other, Body};
use anyhow::anyhow;
use http_body_util::BodyExt;
use hyper::{Method, Request, Response};
use std::fmt::Display;
use tollgate_core::Principal;
use tracing::{debug, error, info};

/// Route, gate and run a single request. Never fails: errors become pages.
pub async fn handle_request<B>(app: &App, req: Request<B>) -> Response<Body>
where
    B: hyper::body::Body,
    B::Error: Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    debug!("Handling {} {}", method, path);

    let response = match route_request(app, req).await {
        Ok(response) => response,
        Err(err) => error_response(app, &method, &path, err),
    };

    info!("{} {} -> {}", method, path, response.status().as_u16());
    response
}

async fn route_request<B>(app: &App, req: Request<B>) -> Result<Response<Body>, HttpError>
where
    B: hyper::body::Body,
    B::Error: Display,
{
    let route = app
        .routes
        .lookup(req.uri().path())
        .ok_or_else(HttpError::not_found)?;

    let cookie = auth_cookie(req.headers()).map(str::to_string);
    let verdict = Verdict::resolve(&app.sessions, cookie.as_deref());
    let requested = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path(), |pq| pq.as_str())
        .to_string();

    match dispatch(route.require_login, verdict, &requested) {
        Control::RedirectToLogin { location } => see_other(&location),
        Control::InternalError(err) => Err(HttpError::internal(err)),
        Control::Invoke(principal) => {
            let query = req.uri().query().map(str::to_string);
            let (parts, body) = req.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| HttpError::bad_request(anyhow!("Failed to read request body: {}", e)))?
                .to_bytes();

            let ctx = RequestContext {
                method: parts.method,
                query,
                principal,
                cookie,
                body,
            };
            pages::handle(app, route.page, ctx).await
        }
    }
}

fn error_response(app: &App, method: &Method, path: &str, err: HttpError) -> Response<Body> {
    if err.status.is_server_error() {
        error!("{} {} failed: {}", method, path, err);
    } else {
        debug!("{} {} rejected: {}", method, path, err);
    }

    match app
        .renderer
        .render(&Principal::Anonymous, &View::Error { status: err.status })
    {
        Ok(body) => html(err.status, body),
        Err(render_err) => {
            error!("Failed to render error page: {:#}", render_err);
            plain_status(err.status)
        }
    }
}
