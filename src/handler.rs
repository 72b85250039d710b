//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! A chain wraps handlers of *different* concrete types around each other, so
//! every handler that crosses a constructor boundary is erased to the same
//! type, [`BoxedHandler`] (`Arc<dyn Handler>`):
//!
//! ```text
//! |cx, w, req| { … }                 ← user writes this
//!        ↓ handler_fn(…)
//! HandlerFn(closure)                 ← implements Handler
//!        ↓ into_boxed_handler()
//! Arc<dyn Handler>                   ← what constructors receive and return
//!        ↓
//! next.serve_ctx(cx, w, req)         ← one vtable dispatch per layer
//! ```
//!
//! The `Arc` lets one composed handler be shared by every request a host
//! serves concurrently.

use std::sync::Arc;

use crate::context::Context;
use crate::request::Request;
use crate::response::ResponseWriter;

/// A heap-allocated, type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Processes one request.
///
/// `serve_ctx` writes the response into `w` and returns. There is no error
/// channel: a failing handler says so through the response (e.g. by
/// committing a 5xx status).
///
/// Implementors only write `serve_ctx`. `serve` is for hosts that do not
/// propagate a context; it always calls `serve_ctx` with a fresh
/// [`Context::background`]. Do not override `serve`: erased handlers ignore
/// overrides and route it through `serve_ctx` anyway.
pub trait Handler: Send + Sync + 'static {
    fn serve_ctx(&self, cx: Context, w: &mut ResponseWriter, req: &Request);

    fn serve(&self, w: &mut ResponseWriter, req: &Request) {
        self.serve_ctx(Context::background(), w, req);
    }

    /// Erases the concrete handler type.
    fn into_boxed_handler(self) -> BoxedHandler
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

/// An already-erased handler is still a handler. Boxing it again is the
/// identity.
impl Handler for BoxedHandler {
    fn serve_ctx(&self, cx: Context, w: &mut ResponseWriter, req: &Request) {
        (**self).serve_ctx(cx, w, req);
    }

    fn serve(&self, w: &mut ResponseWriter, req: &Request) {
        (**self).serve_ctx(Context::background(), w, req);
    }

    fn into_boxed_handler(self) -> BoxedHandler {
        self
    }
}

// ── Closures ──────────────────────────────────────────────────────────────────

/// Adapter that lets an ordinary closure or `fn` act as a [`Handler`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F>(F);

/// Wraps `f` in a [`HandlerFn`].
///
/// ```rust
/// use std::io::Write;
/// use synapse::{Handler, handler_fn};
///
/// let hello = handler_fn(|_cx, w, _req| {
///     let _ = w.write_all(b"hello");
/// });
/// # let _ = hello.into_boxed_handler();
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(Context, &mut ResponseWriter, &Request) + Send + Sync + 'static,
{
    HandlerFn(f)
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(Context, &mut ResponseWriter, &Request) + Send + Sync + 'static,
{
    fn serve_ctx(&self, cx: Context, w: &mut ResponseWriter, req: &Request) {
        (self.0)(cx, w, req);
    }
}

// ── Terminal ──────────────────────────────────────────────────────────────────

/// Anything that may end a chain: a handler, or an optional one.
///
/// A `None` terminal is a programming error; [`Chain::then`](crate::Chain::then)
/// panics on it instead of building a chain around nothing.
pub trait Terminal {
    fn into_terminal(self) -> Option<BoxedHandler>;
}

impl<H: Handler> Terminal for H {
    fn into_terminal(self) -> Option<BoxedHandler> {
        Some(self.into_boxed_handler())
    }
}

impl<H: Handler> Terminal for Option<H> {
    fn into_terminal(self) -> Option<BoxedHandler> {
        self.map(Handler::into_boxed_handler)
    }
}
