//! Built-in middleware.
//!
//! Each function returns a [`Constructor`] ready to drop into a
//! [`Chain`](crate::Chain). They are ordinary constructors with no special
//! treatment from the chain; write your own the same way.
//!
//! - [`trace`]: per-request span with method, path, status, latency
//! - [`set_header`]: sets a response header before the rest of the chain runs
//! - [`with_value`]: stores a value in the request context

mod trace;

pub use trace::trace;

use std::any::Any;

use http::header::{HeaderName, HeaderValue};

use crate::chain::{Constructor, constructor};
use crate::handler::{Handler, handler_fn};

/// Inserts `name: value` into the response headers, then delegates.
///
/// Inner handlers may still overwrite it.
pub fn set_header(name: HeaderName, value: HeaderValue) -> Constructor {
    constructor(move |next| {
        let name = name.clone();
        let value = value.clone();
        handler_fn(move |cx, w, req| {
            w.headers_mut().insert(name.clone(), value.clone());
            next.serve_ctx(cx, w, req);
        })
    })
}

/// Derives a child context carrying `key = value` for the rest of the chain.
///
/// `value` is cloned once per request.
pub fn with_value<T>(key: &'static str, value: T) -> Constructor
where
    T: Any + Clone + Send + Sync,
{
    constructor(move |next| {
        let value = value.clone();
        handler_fn(move |cx, w, req| {
            next.serve_ctx(cx.with_value(key, value.clone()), w, req);
        })
    })
}
