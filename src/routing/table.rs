//! Route table module
//!
//! A fixed association from exact URL path to a wrapped handler. Built once
//! before the listener starts and never mutated afterwards.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hyper::body::Bytes;
use hyper::Request;

use crate::api;
use crate::config::AppState;
use crate::handler::cors::with_cors;
use crate::http::HttpResponse;

/// Future returned by a handler invocation
pub type HandlerFuture = Pin<Box<dyn Future<Output = HttpResponse> + Send>>;

/// A unit of logic bound to one route
///
/// Receives the request with its body already collected plus the shared
/// state, and always yields a response: failures become status codes at
/// the handler boundary.
pub type Handler = Arc<dyn Fn(Request<Bytes>, Arc<AppState>) -> HandlerFuture + Send + Sync>;

/// Adapt an async fn into a `Handler`
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Request<Bytes>, Arc<AppState>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HttpResponse> + Send + 'static,
{
    Arc::new(move |req, state| Box::pin(f(req, state)))
}

/// Whether a route consumes the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Body is discarded unread; the handler sees an empty body
    Ignore,
    /// Body is collected, subject to `http.max_body_size`
    Collect,
}

/// One registered route
pub struct Route {
    pub path: &'static str,
    /// Method label shown in the startup banner
    pub methods: &'static str,
    pub summary: &'static str,
    pub body: BodyMode,
    handler: Handler,
}

impl Route {
    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

/// Route table, in registration order
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The five demonstration endpoints
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.register("/health", "GET", "Health check", BodyMode::Ignore, handler_fn(api::health));
        table.register(
            "/system",
            "GET",
            "System information",
            BodyMode::Ignore,
            handler_fn(api::system_info),
        );
        table.register(
            "/compute",
            "POST",
            "Fibonacci computation",
            BodyMode::Collect,
            handler_fn(api::compute),
        );
        table.register("/files", "GET", "List files", BodyMode::Ignore, handler_fn(api::list_files));
        table.register("/greet", "GET", "Greeting message", BodyMode::Ignore, handler_fn(api::greet));
        table
    }

    /// Register a handler under an exact path, wrapped with the cross-origin policy
    ///
    /// Registering a path twice replaces the earlier handler in place.
    pub fn register(
        &mut self,
        path: &'static str,
        methods: &'static str,
        summary: &'static str,
        body: BodyMode,
        handler: Handler,
    ) {
        let route = Route {
            path,
            methods,
            summary,
            body,
            handler: with_cors(handler),
        };
        match self.routes.iter_mut().find(|r| r.path == path) {
            Some(existing) => *existing = route,
            None => self.routes.push(route),
        }
    }

    /// Resolve a request path; exact match only
    pub fn lookup(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.path == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
