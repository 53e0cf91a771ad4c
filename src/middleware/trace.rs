//! Per-request tracing span.

use std::time::Instant;

use tracing::{Instrument, info, info_span};

use super::Middleware;
use crate::handler::Next;
use crate::request::Request;

/// Opens a `request` span carrying method and path around the rest of the
/// chain, and logs status and latency when the response is ready.
///
/// Put it first in the root scope so the span covers every other layer.
pub fn trace() -> Middleware {
    Middleware::from_fn(|req: Request, next: Next| {
        let span = info_span!("request", method = %req.method(), path = req.path());
        async move {
            let started = Instant::now();
            let res = next.run(req).await;
            info!(
                status = res.status_code().as_u16(),
                latency_us = started.elapsed().as_micros() as u64,
                "request completed",
            );
            res
        }
        .instrument(span)
    })
}
