//! Route registration
//!
//! Every path is registered with the page that serves it and whether it
//! requires login. The auth gate reads the latter; handlers never check it.

use crate::dispatcher::RequireLogin;
use std::collections::HashMap;

/// Business handlers served by the site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Signup,
    MyAccount,
    Logout,
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub page: Page,
    pub require_login: RequireLogin,
}

/// Exact-path route table
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<&'static str, Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The site's pages
    pub fn standard() -> Self {
        RouteTable::new()
            .route("/", RequireLogin::No, Page::Home)
            .route("/signup", RequireLogin::No, Page::Signup)
            .route("/login", RequireLogin::No, Page::Login)
            .route("/myaccount", RequireLogin::Yes, Page::MyAccount)
            .route("/logout", RequireLogin::Yes, Page::Logout)
            .route("/health", RequireLogin::No, Page::Health)
    }

    /// Register `page` at `path`
    pub fn route(mut self, path: &'static str, require_login: RequireLogin, page: Page) -> Self {
        self.routes.insert(path, Route { page, require_login });
        self
    }

    pub fn lookup(&self, path: &str) -> Option<Route> {
        self.routes.get(path).copied()
    }
}
