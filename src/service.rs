//! Hyper host adapter.
//!
//! A composed handler knows nothing about sockets. [`HandlerService`] is the
//! thin bridge that lets any hyper-based host call it: it implements
//! [`hyper::service::Service`], so it plugs straight into
//! `serve_connection`. Accepting connections, protocol negotiation and
//! shutdown stay with the host.
//!
//! Per request the adapter:
//! 1. Buffers the request body into [`Bytes`].
//! 2. Runs the (synchronous) handler on tokio's blocking pool, so a handler
//!    that blocks never stalls the reactor.
//! 3. Converts the filled [`ResponseWriter`] into an [`http::Response`].

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::service::Service;
use tracing::debug;

use crate::context::Context;
use crate::error::Error;
use crate::handler::{BoxedHandler, Handler, Terminal};
use crate::request::Request;
use crate::response::ResponseWriter;

/// A heap-allocated, type-erased future resolving to the converted response.
type BoxFuture = Pin<Box<dyn Future<Output = Result<http::Response<Full<Bytes>>, Error>> + Send>>;

/// Serves a composed handler to a hyper host.
///
/// ```rust,no_run
/// use synapse::{Chain, HandlerService, middleware};
///
/// let app = Chain::new([middleware::trace()]).then_func(|_cx, w, _req| {
///     use std::io::Write;
///     let _ = w.write_all(b"ok");
/// });
/// let svc = HandlerService::new(app);
/// // hand `svc.clone()` to hyper's `serve_connection` for every connection
/// ```
#[derive(Clone)]
pub struct HandlerService {
    handler: BoxedHandler,
    base: Option<Context>,
}

impl HandlerService {
    /// # Panics
    ///
    /// Panics if `handler` is `None`.
    pub fn new(handler: impl Terminal) -> Self {
        let Some(handler) = handler.into_terminal() else {
            panic!("service handler is absent");
        };
        Self { handler, base: None }
    }

    /// Starts every request from a clone of `cx` instead of a fresh
    /// background context.
    pub fn with_context(mut self, cx: Context) -> Self {
        self.base = Some(cx);
        self
    }
}

impl<B> Service<http::Request<B>> for HandlerService
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    type Response = http::Response<Full<Bytes>>;
    type Error = Error;
    type Future = BoxFuture;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let base = self.base.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await.map_err(Error::body)?.to_bytes();
            let req = Request::from_parts(parts, body);

            debug!(method = %req.method(), path = req.uri().path(), "dispatching request");

            let w = tokio::task::spawn_blocking(move || {
                let mut w = ResponseWriter::new();
                match base {
                    Some(cx) => handler.serve_ctx(cx, &mut w, &req),
                    None => handler.serve(&mut w, &req),
                }
                w
            })
            .await?;

            Ok(w.into_response())
        })
    }
}
