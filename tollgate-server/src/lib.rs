//! Tollgate web front door
//!
//! A hyper server whose pages sit behind a cookie session gate. Sessions are
//! signed tokens issued and checked by [`tollgate_core::SessionAuthenticator`];
//! accounts live in a [`tollgate_store::UserStore`].

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod hasher;
pub mod logging;
pub mod pages;
pub mod render;
pub mod response;
pub mod routes;
pub mod server;
pub mod sweeper;

pub use app::App;
pub use config::{LogFormat, ServerConfig};
pub use dispatcher::{dispatch, Control, RequireLogin, Verdict};
pub use error::{HttpError, ServerError};
pub use handlers::handle_request;
pub use server::WebServer;
