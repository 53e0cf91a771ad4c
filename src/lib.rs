//! # tether
//!
//! A minimal routing façade: scoped sub-routers and ordered middleware over
//! one shared radix-tree router.
//!
//! Three things happen here, and only three:
//!
//! - **Base paths compose.** `root.sub_path("/api").sub_path("v1")` registers
//!   under `/api/v1`, with no doubled or missing slashes at the joins.
//! - **Middleware is inherited by copy.** A derived scope starts with its
//!   parent's middleware and appends its own; the parent never sees them.
//! - **Order is fixed.** Scope middleware runs first, in the order added,
//!   then the route's own middleware, then the handler.
//!
//! Matching is [`matchit`]'s job; serving is hyper's. [`Router`] and
//! [`Server`] are thin enough to stay out of the way.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tether::{Middleware, Next, Request, Response, Scope, Server, middleware};
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tether::Error> {
//!     let root = Scope::new().with_middleware([middleware::trace()]);
//!
//!     let api = root.sub_path("/api");
//!     api.get("/users/:id", get_user, &[])
//!        .post("/users", create_user, &[require_json()]);
//!
//!     Server::bind("0.0.0.0:3000").serve(root.router().clone()).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(_req: Request) -> Response {
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/api/users/99")
//!         .json(r#"{"id":"99"}"#)
//! }
//!
//! fn require_json() -> Middleware {
//!     Middleware::from_fn(|req: Request, next: Next| async move {
//!         if req.header("content-type") != Some("application/json") {
//!             return Response::status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
//!         }
//!         next.run(req).await
//!     })
//! }
//! ```

mod error;
mod handler;
mod params;
mod request;
mod response;
mod router;
mod scope;
mod server;

pub mod middleware;

pub use error::Error;
pub use handler::{BoxFuture, Handler, Next};
pub use middleware::Middleware;
pub use params::{Params, params};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use scope::Scope;
pub use server::Server;
