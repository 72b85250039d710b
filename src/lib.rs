//! # synapse
//!
//! Immutable, reusable middleware chains for request handlers.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! A [`Chain`] is an ordered list of constructors, functions that take the
//! next [`Handler`] and return one wrapping it. [`Chain::then`] folds them
//! around a terminal handler so the first constructor is the outermost:
//!
//! ```text
//! Chain::new([log, auth, json]).then(app)   ==   log(auth(json(app)))
//! ```
//!
//! Chains never change. [`Chain::append`] and [`Chain::extend`] return new
//! chains, and [`Chain::then`] can be called any number of times, so one
//! chain can front every route of an application.
//!
//! What synapse intentionally leaves to the host:
//!
//! - **Routing**: pick a handler per path, then call it
//! - **Connections**: accept loops, HTTP/1 vs HTTP/2, TLS
//! - **Concurrency**: composed handlers are `Send + Sync`; run them anywhere
//!
//! [`HandlerService`] bridges a composed handler to hyper for hosts that
//! want one.
//!
//! ## Quick start
//!
//! ```rust
//! use std::io::Write;
//!
//! use http::header::{CONTENT_TYPE, HeaderValue};
//! use synapse::{Chain, Handler, Request, ResponseWriter, middleware};
//!
//! let chain = Chain::new([
//!     middleware::trace(),
//!     middleware::with_value("user", "foobarbaz"),
//!     middleware::set_header(CONTENT_TYPE, HeaderValue::from_static("text/plain")),
//! ]);
//!
//! let app = chain.then_func(|cx, w, _req| {
//!     let user = cx.value::<&'static str>("user").copied().unwrap_or("stranger");
//!     let _ = writeln!(w, "Hello, {user}!");
//! });
//!
//! let mut w = ResponseWriter::new();
//! app.serve(&mut w, &Request::default());
//!
//! assert_eq!(w.headers()[CONTENT_TYPE], "text/plain");
//! assert_eq!(w.body(), b"Hello, foobarbaz!\n");
//! ```

mod chain;
mod context;
mod error;
mod handler;
mod request;
mod response;
mod service;

pub mod middleware;

pub use chain::{Chain, Constructor, constructor};
pub use context::Context;
pub use error::Error;
pub use handler::{BoxedHandler, Handler, HandlerFn, Terminal, handler_fn};
pub use request::Request;
pub use response::{ContentType, ResponseWriter};
pub use service::HandlerService;
