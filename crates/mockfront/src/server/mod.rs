//! HTTP/1.1 listener that answers requests from the route table.
//!
//! Each accepted connection is served on its own tokio task. All tasks
//! share one `Arc<Dispatcher>`; the route table behind it is read-only.

mod handler;
mod query;
mod response;

pub use handler::{handle_metrics_request, handle_mock_request};
pub use query::{decode_path, parse_query_string};
pub use response::{
    build_response_with_headers, matched_response, not_mapped_response, JSON_CONTENT_TYPE,
    NOT_MAPPED_BODY,
};

use crate::route::Dispatcher;
use anyhow::Context;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// The mock server: a bind address and the dispatcher answering on it.
pub struct MockServer {
    addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
}

impl MockServer {
    pub fn new(addr: SocketAddr, dispatcher: Arc<Dispatcher>) -> Self {
        Self { addr, dispatcher }
    }

    /// Serve until the process is stopped.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` completes.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), anyhow::Error>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;
        info!("Listening on http://{}", listener.local_addr()?);
        serve(listener, self.dispatcher, shutdown).await;
        Ok(())
    }
}

/// Accept connections on an already bound listener until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, dispatcher: Arc<Dispatcher>, shutdown: F)
where
    F: Future<Output = ()>,
{
    accept_loop(
        listener,
        move |req| handle_mock_request(req, Arc::clone(&dispatcher)),
        shutdown,
    )
    .await;
}

/// Serve Prometheus metrics on `listener` until `shutdown` completes.
pub async fn serve_metrics<F>(listener: TcpListener, shutdown: F)
where
    F: Future<Output = ()>,
{
    accept_loop(listener, handle_metrics_request, shutdown).await;
}

async fn accept_loop<H, Fut, F>(listener: TcpListener, handler: H, shutdown: F)
where
    H: Fn(Request<Incoming>) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<Response<Full<Bytes>>, Infallible>> + Send + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, remote_addr)) => {
                        let handler = handler.clone();
                        tokio::spawn(async move {
                            let io = TokioIo::new(stream);
                            if let Err(e) = http1::Builder::new()
                                .serve_connection(io, service_fn(handler))
                                .await
                            {
                                debug!("Connection error from {}: {}", remote_addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Accept error: {}", e);
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Listener shutting down");
                break;
            }
        }
    }
}
