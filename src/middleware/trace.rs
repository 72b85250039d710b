//! Per-request tracing.

use std::time::Instant;

use tracing::{info, info_span};

use crate::chain::{Constructor, constructor};
use crate::handler::{Handler, handler_fn};

/// Wraps the rest of the chain in a `request` span and logs one event when
/// it returns.
///
/// Declare it first so the logged latency covers every other middleware.
///
/// ```text
/// INFO request{method=GET path=/users/42}: request finished status=200 latency=183µs
/// ```
pub fn trace() -> Constructor {
    constructor(|next| {
        handler_fn(move |cx, w, req| {
            let span = info_span!("request", method = %req.method(), path = req.uri().path());
            let _entered = span.enter();

            let begin = Instant::now();
            next.serve_ctx(cx, w, req);

            info!(status = w.status().as_u16(), latency = ?begin.elapsed(), "request finished");
        })
    })
}
