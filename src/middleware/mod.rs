//! Middleware layer.
//!
//! A [`Middleware`] is a transform from handler to handler: it receives the
//! [`Next`] it wraps and returns a new one. Wrapping happens once, when a
//! route is registered; see [`Scope::handle`](crate::Scope::handle) for how
//! scope-level and per-route middleware nest.
//!
//! ```rust
//! use tether::{Middleware, Next, Request, Response};
//! use http::StatusCode;
//!
//! let require_token = Middleware::from_fn(|req: Request, next: Next| async move {
//!     if req.header("authorization").is_none() {
//!         return Response::status(StatusCode::UNAUTHORIZED);
//!     }
//!     next.run(req).await
//! });
//! ```

mod trace;

use std::future::Future;
use std::sync::Arc;

use crate::handler::{Handler, Next};
use crate::request::Request;
use crate::response::IntoResponse;

pub use trace::trace;

/// A cloneable, immutable `Next -> Next` transform.
///
/// Clones share the same function, so copying a scope's middleware list
/// copies pointers, not closures.
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(Next) -> Next + Send + Sync + 'static>);

impl Middleware {
    /// Wraps a raw transform.
    pub fn new<F>(wrap: F) -> Self
    where
        F: Fn(Next) -> Next + Send + Sync + 'static,
    {
        Self(Arc::new(wrap))
    }

    /// Builds middleware from an async function of the request and the rest
    /// of the chain. Returning without calling `next.run` short-circuits.
    pub fn from_fn<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |next: Next| {
            let f = Arc::clone(&f);
            Next::new(move |req: Request| f(req, next.clone()))
        })
    }

    /// Runs `handler` as a pass-through step.
    ///
    /// `handler` runs to completion on a clone of the request; only then does
    /// the rest of the chain run, with the original request. What `handler`
    /// produced comes first in the final response, as if both wrote to one
    /// connection: bodies concatenate, and once `handler` has written a body
    /// or a non-`200` status, its status and headers are the ones sent.
    pub fn from_handler(handler: impl Handler) -> Self {
        let handler = handler.into_boxed_handler();
        Self::new(move |next: Next| {
            let handler = Arc::clone(&handler);
            Next::new(move |req: Request| {
                let first = handler.call(req.clone());
                let next = next.clone();
                async move {
                    let early = first.await;
                    let rest = next.run(req).await;
                    early.followed_by(rest)
                }
            })
        })
    }

    pub(crate) fn wrap(&self, next: Next) -> Next {
        (self.0)(next)
    }

    #[cfg(test)]
    pub(crate) fn ptr_eq(&self, other: &Middleware) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Middleware")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::StatusCode;

    use super::*;
    use crate::request::tests::get;
    use crate::response::Response;

    #[tokio::test]
    async fn from_fn_can_short_circuit() {
        let deny = Middleware::from_fn(|_req: Request, _next: Next| async {
            StatusCode::FORBIDDEN
        });
        let chain = deny.wrap(Next::new(|_req: Request| async { "reached" }));

        let res = chain.run(get("/")).await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn raw_transform_sees_the_wrapped_next() {
        let twice = Middleware::new(|next: Next| {
            Next::new(move |req: Request| {
                let next = next.clone();
                async move {
                    let first = next.run(req.clone()).await;
                    let second = next.run(req).await;
                    first.followed_by(second)
                }
            })
        });
        let chain = twice.wrap(Next::new(|_req: Request| async { "ab" }));

        let res = chain.run(get("/")).await;
        assert_eq!(res.body().as_ref(), b"abab");
    }

    #[tokio::test]
    async fn handler_middleware_finishes_before_next_starts() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let audit = {
            let log = Arc::clone(&log);
            move |_req: Request| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push("audit start");
                    tokio::task::yield_now().await;
                    log.lock().unwrap().push("audit end");
                    Response::builder().header("x-audited", "yes").no_body()
                }
            }
        };
        let endpoint = {
            let log = Arc::clone(&log);
            move |_req: Request| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push("endpoint");
                    "done"
                }
            }
        };

        let chain = Middleware::from_handler(audit).wrap(Next::new(endpoint));
        let res = chain.run(get("/")).await;

        assert_eq!(*log.lock().unwrap(), ["audit start", "audit end", "endpoint"]);
        assert_eq!(res.headers()["x-audited"], "yes");
        assert_eq!(res.body().as_ref(), b"done");
    }
}
