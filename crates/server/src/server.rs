use crate::config::ServerConfig;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Request, Response, StatusCode};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use micro_typed::{RequestHandler, ResponseBody, ResponseWriter};
use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("handler must be set")]
    MissingHandler,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("connections still open after waiting {0:?} for shutdown")]
    ShutdownTimeout(Duration),
}

pub struct ServerBuilder {
    config: ServerConfig,
    handler: Option<Arc<dyn RequestHandler<Incoming>>>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { config: ServerConfig::default(), handler: None }
    }

    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// The handler every request is dispatched to, usually a [`Routes`](crate::Routes) table.
    #[must_use]
    pub fn handler(mut self, handler: impl RequestHandler<Incoming> + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let handler = self.handler.ok_or(ServerBuildError::MissingHandler)?;
        Ok(Server { config: self.config, handler })
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Serves a [`RequestHandler`] over HTTP/1.1, one tokio task per connection.
pub struct Server {
    config: ServerConfig,
    handler: Arc<dyn RequestHandler<Incoming>>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn serve<S>(self, shutdown: S) -> Result<(), ServerError>
    where
        S: Future<Output = ()>,
    {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|source| ServerError::Bind { addr, source })?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serves connections accepted from `listener` until `shutdown` resolves, then waits for the
    /// open connections to finish, at most for the configured shutdown timeout.
    pub async fn serve_listener<S>(self, listener: TcpListener, shutdown: S) -> Result<(), ServerError>
    where
        S: Future<Output = ()>,
    {
        info!(address = %listener.local_addr()?, "start listening");

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.header_read_timeout())
            .max_buf_size(self.config.max_header_bytes());

        let graceful = GracefulShutdown::new();
        let request_timeout = self.config.request_timeout();
        let mut shutdown = std::pin::pin!(shutdown);

        loop {
            let (tcp_stream, remote_addr) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
                () = &mut shutdown => break,
            };

            let handler = Arc::clone(&self.handler);
            let service = service_fn(move |req| {
                let handler = Arc::clone(&handler);
                async move { Ok::<_, Infallible>(dispatch(handler.as_ref(), req, request_timeout).await) }
            });

            let connection = graceful.watch(builder.serve_connection(TokioIo::new(tcp_stream), service));
            tokio::spawn(async move {
                match connection.await {
                    Ok(()) => debug!(%remote_addr, "finished process, connection shutdown"),
                    Err(e) => error!(%remote_addr, cause = %e, "service has error, connection shutdown"),
                }
            });
        }

        drop(listener);
        info!("shutting down");

        let shutdown_timeout = self.config.shutdown_timeout();
        tokio::select! {
            () = graceful.shutdown() => {
                info!("all connections closed");
                Ok(())
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                Err(ServerError::ShutdownTimeout(shutdown_timeout))
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server").field("config", &self.config).finish_non_exhaustive()
    }
}

async fn dispatch(
    handler: &dyn RequestHandler<Incoming>,
    req: Request<Incoming>,
    request_timeout: Duration,
) -> Response<ResponseBody> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(request_timeout, handler.invoke(req)).await {
        Ok(response) => {
            debug!(%method, path = %path, status = %response.status(), "request handled");
            response
        }
        Err(_) => {
            warn!(%method, path = %path, timeout = ?request_timeout, "request timed out");
            let mut writer = ResponseWriter::new();
            writer.set_header(CONTENT_TYPE, HeaderValue::from_static(mime::TEXT_PLAIN_UTF_8.as_ref()));
            writer.write_status(StatusCode::SERVICE_UNAVAILABLE);
            writer.write_bytes(b"request timed out\n");
            writer.into_response()
        }
    }
}

/// Resolves once the process receives SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(cause = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(cause = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
