//! HTTP server and graceful shutdown.
//!
//! Every request is read in full (up to the configured body limit), then
//! routed once: paths under the REST prefix go to the
//! [`UriDispatcher`], everything else to the page [`Router`].
//!
//! # Graceful shutdown
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::dispatch::{Dispatch, UriDispatcher};
use crate::error::Error;
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Lookup, Router};
use crate::status::Status;

/// Both route tables plus the state handed to every handler.
///
/// [`Routes::handle`] is the whole request pipeline minus the socket, so it
/// can be driven directly in tests.
pub struct Routes<S> {
    state: S,
    rest: UriDispatcher<S>,
    pages: Router<S>,
    rest_prefix: String,
}

impl<S: Clone + Send + Sync + 'static> Routes<S> {
    /// The REST dispatcher is mounted at `/rest` until
    /// [`with_rest_prefix`](Routes::with_rest_prefix) says otherwise.
    pub fn new(state: S, rest: UriDispatcher<S>, pages: Router<S>) -> Self {
        Self { state, rest, pages, rest_prefix: "/rest".to_owned() }
    }

    pub fn with_rest_prefix(mut self, prefix: &str) -> Self {
        self.rest_prefix = prefix.to_owned();
        self
    }

    /// Routes one fully-read request.
    pub async fn handle(&self, req: Request) -> Response {
        if let Some(rest_path) = self.rest_path(req.path()) {
            let req = req.with_route_path(&rest_path);
            return match self.rest.dispatch(self.state.clone(), req).await {
                Dispatch::Handled(res) => res,
                Dispatch::Unmatched => Response::builder()
                    .status(Status::BadRequest)
                    .text("no dispatcher found for this request"),
            };
        }

        match self.pages.lookup(req.method(), req.path()) {
            Lookup::Found(handler, params) => {
                handler.call(self.state.clone(), req.with_params(params)).await
            }
            Lookup::MethodNotAllowed => Response::status(Status::MethodNotAllowed),
            Lookup::NotFound => Response::status(Status::NotFound),
        }
    }

    /// The path relative to the REST prefix, when `path` lies under it.
    fn rest_path(&self, path: &str) -> Option<String> {
        let rest = path.strip_prefix(&self.rest_prefix)?;
        if rest.is_empty() {
            Some("/".to_owned())
        } else if rest.starts_with('/') {
            Some(rest.to_owned())
        } else {
            None
        }
    }
}

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    max_body_size: usize,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called. Request bodies are limited to 1 MiB.
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr, max_body_size: 1024 * 1024 }
    }

    /// Address and body limit from the `[server]` configuration section.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let addr = config.socket_addr()?;
        Ok(Self::bind(addr).max_body_size(config.server.max_body_size))
    }

    /// Bodies larger than `bytes` are answered with `413 Content Too Large`.
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Starts accepting connections and routing them through `routes`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve<S>(self, routes: Routes<S>) -> Result<(), Error>
    where
        S: Clone + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        let routes = Arc::new(routes);
        let max_body_size = self.max_body_size;

        info!(addr = %self.addr, rest_prefix = %routes.rest_prefix, "mvcblog listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown is checked first so a SIGTERM stops accepting even
                // while connections are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let routes = Arc::clone(&routes);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let routes = Arc::clone(&routes);
                            async move { serve_request(&routes, req, max_body_size).await }
                        });

                        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("mvcblog stopped");
        Ok(())
    }
}

/// Converts one hyper request, routes it and converts the answer back.
/// Every failure becomes an HTTP status, so hyper never sees an error.
async fn serve_request<S>(
    routes: &Routes<S>,
    req: hyper::Request<Incoming>,
    max_body_size: usize,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    S: Clone + Send + Sync + 'static,
{
    let response = match read_request(req, max_body_size).await {
        Ok(req) => {
            let method = req.method();
            let path = req.uri_path().to_owned();
            let res = routes.handle(req).await;
            debug!(%method, %path, status = res.status_code(), "request");
            res
        }
        Err(res) => res,
    };
    Ok(response.into_http())
}

async fn read_request(req: hyper::Request<Incoming>, max_body_size: usize) -> Result<Request, Response> {
    let (parts, body) = req.into_parts();

    let Ok(method) = parts.method.as_str().parse::<Method>() else {
        warn!(method = %parts.method, "unsupported method");
        return Err(Response::status(Status::MethodNotAllowed));
    };

    let body = match Limited::new(body, max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            warn!(limit = max_body_size, "request body too large");
            return Err(Response::status(Status::ContentTooLarge));
        }
        Err(e) => {
            warn!("failed to read request body: {e}");
            return Err(Response::status(Status::BadRequest));
        }
    };

    let target = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
    let mut request = Request::new(method, target).with_body(body.to_vec());
    for (name, value) in &parts.headers {
        match value.to_str() {
            Ok(value) => request = request.with_header(name.as_str(), value),
            Err(_) => debug!(header = %name, "skipping non-ASCII header value"),
        }
    }
    Ok(request)
}

/// Resolves on the first shutdown signal the process receives: SIGTERM or
/// SIGINT on Unix, Ctrl-C elsewhere. A signal whose handler cannot be
/// installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
