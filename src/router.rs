//! Radix-tree request router.
//!
//! One [`matchit`] tree per HTTP method. O(path-length) lookup. The router
//! only stores and finds handlers; scoping and middleware live in
//! [`Scope`](crate::Scope), which registers fully wrapped chains here.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use http::header::ALLOW;
use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::trace;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::params::Params;
use crate::request::Request;
use crate::response::Response;

/// A shared route table.
///
/// `Router` is a handle: clones refer to the same table, so every scope
/// derived from one root registers into one place, and the server dispatches
/// against it. Register routes at startup; the table is read-locked only for
/// the duration of a lookup, never across a handler's `.await`.
///
/// Patterns use `:name` for a single segment and `*name` for a trailing
/// catch-all. Catch-alls follow matchit: the bound value has no leading `/`
/// (`/static/*file` on `/static/css/a.css` binds `css/a.css`), and at least
/// one character must follow the prefix, so `/static/` itself does not match.
///
/// ```rust
/// use http::Method;
/// use tether::{Request, Router};
///
/// let router = Router::new();
/// router.handle(Method::GET, "/users/:id", |req: Request| async move {
///     format!("user {}", req.param("id").unwrap_or_default())
/// });
/// router.handle(Method::GET, "/static/*file", |_req: Request| async { "file" });
/// ```
#[derive(Clone)]
pub struct Router {
    table: Arc<RwLock<Table>>,
}

struct Table {
    trees: HashMap<Method, MatchitRouter<BoxedHandler>>,
    routes: Vec<(Method, String)>,
    handle_method_not_allowed: bool,
}

enum Lookup {
    Found(BoxedHandler, Params),
    MethodNotAllowed(String),
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table {
                trees: HashMap::new(),
                routes: Vec::new(),
                handle_method_not_allowed: true,
            })),
        }
    }

    /// When `true` (the default), a path registered under other methods
    /// answers `405 Method Not Allowed` with an `allow` header. When `false`
    /// it answers `404 Not Found`, as if the path were unknown.
    pub fn handle_method_not_allowed(self, enabled: bool) -> Self {
        self.write().handle_method_not_allowed = enabled;
        self
    }

    /// Registers `handler` for `method` and `pattern`.
    ///
    /// Fails when the pattern is malformed or conflicts with a route already
    /// registered for the same method.
    pub fn insert(&self, method: Method, pattern: &str, handler: impl Handler) -> Result<(), Error> {
        let mut table = self.write();
        table.trees
            .entry(method.clone())
            .or_default()
            .insert(to_matchit(pattern), handler.into_boxed_handler())
            .map_err(|source| Error::Route { path: pattern.to_owned(), source })?;
        table.routes.push((method, pattern.to_owned()));
        Ok(())
    }

    /// Like [`insert`](Router::insert), for route tables built at startup.
    ///
    /// # Panics
    ///
    /// Panics if the route is rejected.
    pub fn handle(&self, method: Method, pattern: &str, handler: impl Handler) {
        if let Err(e) = self.insert(method, pattern, handler) {
            panic!("{e}");
        }
    }

    /// Registered `(method, pattern)` pairs, in registration order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.read().routes.clone()
    }

    /// Routes one request and produces one response.
    ///
    /// On a match the bound path parameters are attached to the request
    /// before the handler runs.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let lookup = self.lookup(req.method(), req.path());
        match lookup {
            Lookup::Found(handler, params) => {
                req.params = params;
                handler.call(req).await
            }
            Lookup::MethodNotAllowed(allow) => {
                trace!(method = %req.method(), path = req.path(), %allow, "method not allowed");
                Response::builder()
                    .status(StatusCode::METHOD_NOT_ALLOWED)
                    .header(ALLOW, allow)
                    .no_body()
            }
            Lookup::NotFound => {
                trace!(method = %req.method(), path = req.path(), "no route");
                Response::status(StatusCode::NOT_FOUND)
            }
        }
    }

    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        let table = self.read();

        if let Some(matched) = table.trees.get(method).and_then(|tree| tree.at(path).ok()) {
            return Lookup::Found(Arc::clone(matched.value), Params::from(matched.params));
        }

        if table.handle_method_not_allowed {
            let mut allowed: Vec<&str> = table.trees.iter()
                .filter(|(m, tree)| *m != method && tree.at(path).is_ok())
                .map(|(m, _)| m.as_str())
                .collect();
            if !allowed.is_empty() {
                allowed.sort_unstable();
                return Lookup::MethodNotAllowed(allowed.join(", "));
            }
        }

        Lookup::NotFound
    }

    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Rewrites `:name` and `*name` segments into matchit's `{name}` and
/// `{*name}`. Anything else, including native `{name}` segments, is kept.
fn to_matchit(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else if let Some(name) = segment.strip_prefix('*') {
                format!("{{*{name}}}")
            } else {
                segment.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
