//! Minimal synapse host: one chain, two terminals, served over hyper.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example hello
//!
//! Try:
//!   curl -i http://localhost:3000/
//!   curl -i http://localhost:3000/healthz

use std::io::Write;
use std::net::SocketAddr;

use http::header::{CONTENT_TYPE, HeaderValue};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use synapse::{BoxedHandler, Chain, Context, Handler, HandlerService, Request, ResponseWriter, middleware};
use tokio::net::TcpListener;
use tracing::{error, info};

const ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    // One chain, reused for both terminals.
    let common = Chain::new([
        middleware::trace(),
        middleware::with_value("user", "foobarbaz"),
        middleware::set_header(CONTENT_TYPE, HeaderValue::from_static("text/plain")),
    ]);
    let greet = common.then_func(hello);
    let healthz = common.then_func(|_cx, w, _req| {
        let _ = w.write_all(b"ok");
    });

    // Routing is the host's job; a single match is enough here.
    let app = synapse::handler_fn(move |cx, w, req| route(&greet, &healthz, cx, w, req));
    let svc = HandlerService::new(app);

    let addr: SocketAddr = ADDR.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    let mut tasks = tokio::task::JoinSet::new();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                break;
            }

            res = listener.accept() => {
                let (stream, peer) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        error!("accept error: {e}");
                        continue;
                    }
                };

                let svc = svc.clone();
                tasks.spawn(async move {
                    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                        .serve_connection(TokioIo::new(stream), svc)
                        .await
                    {
                        error!(%peer, "connection error: {e}");
                    }
                });
            }

            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
        }
    }

    while tasks.join_next().await.is_some() {}

    info!("stopped");
    Ok(())
}

fn route(
    greet: &BoxedHandler,
    healthz: &BoxedHandler,
    cx: Context,
    w: &mut ResponseWriter,
    req: &Request,
) {
    match req.uri().path() {
        "/" => greet.serve_ctx(cx, w, req),
        "/healthz" => healthz.serve_ctx(cx, w, req),
        _ => w.write_header(http::StatusCode::NOT_FOUND),
    }
}

fn hello(cx: Context, w: &mut ResponseWriter, _req: &Request) {
    let user = cx.value::<&'static str>("user").copied().unwrap_or("stranger");
    let _ = writeln!(w, "Hello, {user}!");
}
