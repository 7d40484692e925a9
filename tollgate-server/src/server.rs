//! HTTP/1.1 server

use crate::app::App;
use crate::error::ServerError;
use crate::handlers::handle_request;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

pub struct WebServer {
    app: Arc<App>,
}

impl WebServer {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    /// Bind `addr` and serve until `shutdown` resolves
    pub async fn serve(
        self,
        addr: SocketAddr,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        info!("Tollgate listening on {}", listener.local_addr()?);

        self.serve_listener(listener, shutdown).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), ServerError> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (stream, remote_addr) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            warn!("Failed to accept connection: {}", err);
                            continue;
                        }
                    };
                    debug!("New connection from {}", remote_addr);

                    let app = self.app.clone();
                    tokio::spawn(async move {
                        if let Err(err) = Self::handle_connection(stream, app).await {
                            error!("Connection error from {}: {}", remote_addr, err);
                        }
                    });
                }
            }
        }
    }

    async fn handle_connection(stream: TcpStream, app: Arc<App>) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);

        let service = service_fn(move |req| {
            let app = app.clone();
            async move { Ok::<_, Infallible>(handle_request(&app, req).await) }
        });

        http1::Builder::new().serve_connection(io, service).await
    }
}
