//! Minimal tether example: nested scopes, inherited middleware, path params.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/api/v1/users/42
//!   curl -X POST http://localhost:3000/api/v1/users -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/api/v1/admin/users/42
//!   curl -X DELETE -H 'x-admin: yes' http://localhost:3000/api/v1/admin/users/42
//!   curl http://localhost:3000/healthz

use http::StatusCode;
use tether::{Middleware, Next, Request, Response, Scope, Server, middleware};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let root = Scope::new()
        .with_middleware([middleware::trace()])
        .with_handler_middleware(server_header);

    root.get("/healthz", |_req: Request| async { "ok" }, &[]);

    let v1 = root.sub_path("/api/v1");
    v1.get("/users/:id", get_user, &[])
      .post("/users", create_user, &[]);

    // Only routes under /admin pay for the check.
    let admin = v1.sub_path("/admin").with_middleware([require_admin()]);
    admin.delete("/users/:id", delete_user, &[]);

    Server::bind("0.0.0.0:3000")
        .serve(root.router().clone())
        .await
        .expect("server error");
}

// Runs before every route; its headers land on every response.
async fn server_header(_req: Request) -> Response {
    Response::builder().header("server", "tether").no_body()
}

fn require_admin() -> Middleware {
    Middleware::from_fn(|req: Request, next: Next| async move {
        if req.header("x-admin") != Some("yes") {
            return Response::status(StatusCode::FORBIDDEN);
        }
        next.run(req).await
    })
}

// GET /api/v1/users/:id
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /api/v1/users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/api/v1/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#)
}

// DELETE /api/v1/admin/users/:id → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}
