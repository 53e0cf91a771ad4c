//! Scoped registration on top of a shared [`Router`].
//!
//! A [`Scope`] is a base path plus an ordered middleware list, pointing at
//! the one route table every scope in the tree shares. Deriving a scope
//! copies the list, so a child can add middleware without its parent (or
//! its siblings) ever seeing it:
//!
//! ```text
//! root            base ""       middleware [trace]
//! ├─ api          base "/api"   middleware [trace]
//! │  └─ admin     base "/api"   middleware [trace, auth]
//! └─ health       base "/health" middleware [trace]
//! ```

use http::Method;
use tracing::debug;

use crate::handler::{Handler, Next};
use crate::middleware::Middleware;
use crate::router::Router;

/// The routing façade.
///
/// ```rust
/// use tether::{Request, Scope, middleware};
///
/// async fn list_items(_req: Request) -> &'static str { "[]" }
/// async fn get_item(req: Request) -> String {
///     format!("item {}", req.param("id").unwrap_or_default())
/// }
///
/// let root = Scope::new().with_middleware([middleware::trace()]);
/// let api = root.sub_path("/api");
/// api.get("/items", list_items, &[])
///    .get("/items/:id", get_item, &[]);
///
/// let router = root.router().clone(); // hand this to `Server::serve`
/// # let _ = router;
/// ```
pub struct Scope {
    router: Router,
    base_path: String,
    middleware: Vec<Middleware>,
}

impl Scope {
    /// A root scope over a fresh [`Router`].
    ///
    /// The router answers `404 Not Found`, not `405`, when a registered path
    /// is requested with another method.
    pub fn new() -> Self {
        Self {
            router: Router::new().handle_method_not_allowed(false),
            base_path: String::new(),
            middleware: Vec::new(),
        }
    }

    /// The shared route table. Every scope derived from the same root
    /// returns a handle to the same table.
    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    /// Joins `p` onto this scope's base path.
    ///
    /// Trailing slashes on the base are dropped and `p` gains a leading `/`
    /// if it lacks one. An empty `p` yields the trimmed base unchanged.
    pub fn path(&self, p: &str) -> String {
        join(&self.base_path, p)
    }

    /// A child scope at `self.path(p)`, inheriting a copy of this scope's
    /// middleware.
    pub fn sub_path(&self, p: &str) -> Scope {
        Scope {
            router: self.router.clone(),
            base_path: self.path(p),
            middleware: self.middleware.clone(),
        }
    }

    /// A scope at the same base path with `middleware` appended, in order,
    /// after the inherited list. `self` is left untouched.
    pub fn with_middleware(&self, middleware: impl IntoIterator<Item = Middleware>) -> Scope {
        let mut scope = self.sub_path("");
        scope.middleware.extend(middleware);
        scope
    }

    /// Like [`with_middleware`](Scope::with_middleware), with a plain handler
    /// running as a pass-through step. See [`Middleware::from_handler`].
    pub fn with_handler_middleware(&self, handler: impl Handler) -> Scope {
        self.with_middleware([Middleware::from_handler(handler)])
    }

    /// Registers `handler` for `method` at `self.path(path)`.
    ///
    /// The scope's middleware wrap the route's `middleware`, which wrap the
    /// handler. Within each list the first entry is outermost, so a request
    /// runs scope middleware in the order they were added, then route
    /// middleware in the order given, then the handler.
    ///
    /// # Panics
    ///
    /// Panics if the router rejects the route (malformed pattern, or a
    /// conflict with an existing route for the same method).
    pub fn handle(
        &self,
        method: Method,
        path: &str,
        handler: impl Handler,
        middleware: &[Middleware],
    ) -> &Self {
        let mut next = Next::new(handler);
        for mw in middleware.iter().rev() {
            next = mw.wrap(next);
        }
        for mw in self.middleware.iter().rev() {
            next = mw.wrap(next);
        }

        let path = self.path(path);
        debug!(
            %method,
            path = %path,
            middleware = self.middleware.len() + middleware.len(),
            "route registered",
        );
        self.router.handle(method, &path, next);
        self
    }

    pub fn get(&self, path: &str, handler: impl Handler, middleware: &[Middleware]) -> &Self {
        self.handle(Method::GET, path, handler, middleware)
    }

    pub fn put(&self, path: &str, handler: impl Handler, middleware: &[Middleware]) -> &Self {
        self.handle(Method::PUT, path, handler, middleware)
    }

    pub fn post(&self, path: &str, handler: impl Handler, middleware: &[Middleware]) -> &Self {
        self.handle(Method::POST, path, handler, middleware)
    }

    pub fn patch(&self, path: &str, handler: impl Handler, middleware: &[Middleware]) -> &Self {
        self.handle(Method::PATCH, path, handler, middleware)
    }

    pub fn delete(&self, path: &str, handler: impl Handler, middleware: &[Middleware]) -> &Self {
        self.handle(Method::DELETE, path, handler, middleware)
    }

    pub fn options(&self, path: &str, handler: impl Handler, middleware: &[Middleware]) -> &Self {
        self.handle(Method::OPTIONS, path, handler, middleware)
    }
}

impl Default for Scope {
    fn default() -> Self { Self::new() }
}

fn join(base: &str, p: &str) -> String {
    let base = base.trim_end_matches('/');
    if p.is_empty() {
        base.to_owned()
    } else if p.starts_with('/') {
        format!("{base}{p}")
    } else {
        format!("{base}/{p}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use http::StatusCode;
    use proptest::prelude::*;

    use super::*;
    use crate::Request;
    use crate::params::params;
    use crate::request::tests::{get, request};
    use crate::response::Response;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(name: &'static str, log: &Log) -> Middleware {
        let log = Arc::clone(log);
        Middleware::from_fn(move |req: Request, next: Next| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(name.to_owned());
                let res = next.run(req).await;
                log.lock().unwrap().push(format!("{name} after"));
                res
            }
        })
    }

    fn scope_at(base: &str) -> Scope {
        let mut scope = Scope::new();
        scope.base_path = base.to_owned();
        scope
    }

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    #[test]
    fn path_joins_without_double_slash() {
        let scope = scope_at("/v1/");
        assert_eq!(scope.path("/users"), "/v1/users");
        assert_eq!(scope.path("users"), "/v1/users");
        assert_eq!(scope.path(""), "/v1");
        assert_eq!(Scope::new().path("items"), "/items");
        assert_eq!(Scope::new().path(""), "");
    }

    #[test]
    fn sub_path_composes_onto_the_trimmed_base() {
        let child = scope_at("/v1/").sub_path("/users");
        assert_eq!(child.base_path(), "/v1/users");
        assert_eq!(child.sub_path(":id").base_path(), "/v1/users/:id");
    }

    #[test]
    fn deriving_never_touches_the_parent() {
        let log = Log::default();
        let a = recording("A", &log);
        let parent = Scope::new().with_middleware([a.clone()]);

        let child = parent.sub_path("/x");
        let grandchild = child.with_middleware([recording("B", &log)]);
        let _sibling = parent.with_handler_middleware(ok);

        assert_eq!(parent.middleware().len(), 1);
        assert!(parent.middleware()[0].ptr_eq(&a));
        assert_eq!(child.middleware().len(), 1);
        assert_eq!(grandchild.middleware().len(), 2);
        assert!(grandchild.middleware()[0].ptr_eq(&a));
        assert_eq!(grandchild.base_path(), "/x");
    }

    #[tokio::test]
    async fn scope_middleware_wraps_route_middleware() {
        let log = Log::default();
        let scope = Scope::new()
            .with_middleware([recording("A", &log)])
            .with_middleware([recording("B", &log)]);

        let handler = {
            let log = Arc::clone(&log);
            move |_req: Request| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push("handler".to_owned());
                    "done"
                }
            }
        };
        scope.get("/run", handler, &[recording("C", &log), recording("D", &log)]);

        let res = scope.router().dispatch(get("/run")).await;
        assert_eq!(res.body().as_ref(), b"done");
        assert_eq!(
            *log.lock().unwrap(),
            ["A", "B", "C", "D", "handler", "D after", "C after", "B after", "A after"],
        );
    }

    #[tokio::test]
    async fn handler_middleware_runs_before_the_rest_of_the_chain() {
        let log = Log::default();
        let stamp = {
            let log = Arc::clone(&log);
            move |_req: Request| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push("stamp".to_owned());
                    Response::builder().header("x-stamp", "1").no_body()
                }
            }
        };
        let scope = Scope::new().with_handler_middleware(stamp);
        scope.get("/", ok, &[recording("route", &log)]);

        let res = scope.router().dispatch(get("/")).await;
        assert_eq!(*log.lock().unwrap(), ["stamp", "route", "route after"]);
        assert_eq!(res.headers()["x-stamp"], "1");
        assert_eq!(res.body().as_ref(), b"ok");
    }

    #[tokio::test]
    async fn handler_middleware_body_commits_status_and_headers() {
        let scope = Scope::new().with_handler_middleware(|_req: Request| async { "banner\n" });
        scope.get("/gone", |_req: Request| async {
            Response::builder().status(StatusCode::NOT_FOUND).json("{}")
        }, &[]);

        let res = scope.router().dispatch(get("/gone")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "text/plain; charset=utf-8");
        assert_eq!(res.body().as_ref(), b"banner\n{}");
    }

    #[tokio::test]
    async fn sub_scope_registers_the_composed_path() {
        let root = Scope::new();
        let api = root.sub_path("/api");
        api.get("/items", ok, &[]);

        assert_eq!(root.router().routes(), vec![(Method::GET, "/api/items".to_owned())]);
        let res = root.router().dispatch(get("/api/items")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        let res = root.router().dispatch(get("/items")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_path_registers_at_the_base() {
        let users = Scope::new().sub_path("/users/");
        users.post("", ok, &[]);

        assert_eq!(users.router().routes(), vec![(Method::POST, "/users".to_owned())]);
    }

    #[tokio::test]
    async fn verbs_register_their_method() {
        let scope = Scope::new().sub_path("/r");
        scope.get("", ok, &[])
            .put("", ok, &[])
            .post("", ok, &[])
            .patch("", ok, &[])
            .delete("", ok, &[])
            .options("", ok, &[])
            .handle(Method::HEAD, "", ok, &[]);

        let methods: Vec<Method> = scope.router().routes().into_iter().map(|(m, _)| m).collect();
        assert_eq!(
            methods,
            [
                Method::GET,
                Method::PUT,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
                Method::HEAD,
            ],
        );
    }

    #[tokio::test]
    async fn unmatched_method_is_not_found() {
        let scope = Scope::new();
        scope.get("/only-get", ok, &[]);

        let res = scope.router().dispatch(request(Method::POST, "/only-get")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn params_reach_the_handler() {
        async fn show(req: Request) -> String {
            let bound: Vec<_> = params(&req).iter().map(|(k, v)| format!("{k}={v}")).collect();
            bound.join(",")
        }

        let scope = Scope::new().sub_path("/users");
        scope.get("/:id", show, &[]);
        scope.get("/me", show, &[]).get("", show, &[]);

        let res = scope.router().dispatch(get("/users/42")).await;
        assert_eq!(res.body().as_ref(), b"id=42");
        let res = scope.router().dispatch(get("/users")).await;
        assert!(res.body().is_empty());
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn duplicate_registration_surfaces_from_the_router() {
        let scope = Scope::new();
        scope.get("/dup", ok, &[]);
        scope.sub_path("/").get("dup", ok, &[]);
    }

    proptest! {
        #[test]
        fn join_never_doubles_or_drops_the_slash(
            base in "(/[a-z0-9:]{0,6}){0,3}/{0,2}",
            p in "(/?[a-z0-9:]{1,6}(/[a-z0-9]{1,4}){0,2})?",
        ) {
            let joined = join(&base, &p);
            let trimmed = base.trim_end_matches('/');

            if p.is_empty() {
                prop_assert_eq!(joined, trimmed);
            } else {
                prop_assert!(joined.starts_with(trimmed));
                let rest = &joined[trimmed.len()..];
                prop_assert!(rest.starts_with('/'));
                prop_assert!(!rest.starts_with("//"));
                prop_assert_eq!(rest.trim_start_matches('/'), p.trim_start_matches('/'));
            }
        }
    }
}
