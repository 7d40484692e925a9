//! Shared application state

use crate::hasher::{Argon2Hasher, PasswordHasher};
use crate::render::{HtmlRenderer, Renderer};
use crate::routes::RouteTable;
use std::sync::Arc;
use tollgate_core::SessionAuthenticator;
use tollgate_store::UserStore;

/// Everything a request handler can reach. Built once, shared by every
/// connection.
pub struct App {
    pub sessions: Arc<SessionAuthenticator>,
    pub users: Arc<dyn UserStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub renderer: Arc<dyn Renderer>,
    pub routes: RouteTable,
}

impl App {
    /// Standard routes, Argon2 hashing and the built-in pages
    pub fn new(sessions: SessionAuthenticator, users: Arc<dyn UserStore>) -> Self {
        App {
            sessions: Arc::new(sessions),
            users,
            hasher: Arc::new(Argon2Hasher::new()),
            renderer: Arc::new(HtmlRenderer::new()),
            routes: RouteTable::standard(),
        }
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }
}
