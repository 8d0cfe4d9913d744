//! Core server-related functionality.

use crate::config::{ServerConfig, WebConfig};
use crate::router::{RouterBootstrap, RouterBootstrapError};
use axum::Router;
use futures::future::try_join_all;
use hyper::server::conn::AddrIncoming;
use hyper::Error as HyperError;
use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

/// Errors related to bootstrapping servers.
#[derive(Error, Debug)]
pub enum ServerBootstrapError {
    #[error("Error parsing listen address: {0}")]
    ListenAddressParseError(#[from] AddrParseError),
    #[error("Error binding server: {0}")]
    BindError(#[source] HyperError),
    #[error("Error creating router: {0}")]
    RouterError(#[from] RouterBootstrapError),
}

/// Sending a value (or dropping the sender) stops all servers gracefully.
pub type ShutdownSignalSender = watch::Sender<()>;

/// Receiving side of a [ShutdownSignalSender].
pub type ShutdownSignalReceiver = watch::Receiver<()>;

pub fn shutdown_signal() -> (ShutdownSignalSender, ShutdownSignalReceiver) {
    watch::channel(())
}

/// A server with a bound listener and its router, ready to accept connections.
pub struct BoundServer {
    name: String,
    incoming: AddrIncoming,
    router: Router,
}

impl BoundServer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.incoming.local_addr()
    }

    /// Serves requests until the shutdown signal is sent.
    pub async fn serve(self, mut shutdown: ShutdownSignalReceiver) -> Result<(), HyperError> {
        info!(server = %self.name, address = %self.local_addr(), "Listening");

        axum::Server::builder(self.incoming)
            .serve(self.router.into_make_service())
            .with_graceful_shutdown(async move {
                // a closed channel counts as a shutdown request
                let _ = shutdown.changed().await;
            })
            .await
    }
}

/// Creates and runs all servers from a [WebConfig].
pub struct ServerRunner<R: RouterBootstrap> {
    router_bootstrap: R,
    config: WebConfig,
}

impl<R: RouterBootstrap> ServerRunner<R> {
    pub fn new(router_bootstrap: R, config: WebConfig) -> Self {
        Self {
            router_bootstrap,
            config,
        }
    }

    fn bind_server(
        &self,
        server_name: &str,
        config: &ServerConfig,
    ) -> Result<BoundServer, ServerBootstrapError> {
        let address: SocketAddr = config.listen_address.parse()?;
        let incoming = AddrIncoming::bind(&address).map_err(ServerBootstrapError::BindError)?;
        let router = self.router_bootstrap.bootstrap_router(server_name, config)?;

        Ok(BoundServer {
            name: server_name.to_string(),
            incoming,
            router,
        })
    }

    /// Binds listeners for all configured servers. Must be called within a tokio runtime.
    pub fn bind(&self) -> Result<Vec<BoundServer>, ServerBootstrapError> {
        self.config
            .servers
            .iter()
            .map(|(server_name, config)| self.bind_server(server_name, config))
            .collect()
    }

    /// Binds and serves all configured servers until shutdown.
    pub async fn run(&self, shutdown: ShutdownSignalReceiver) -> Result<(), ServerRunError> {
        let servers = self.bind()?;
        serve_all(servers, shutdown).await
    }
}

/// Errors related to running servers.
#[derive(Error, Debug)]
pub enum ServerRunError {
    #[error("Error bootstrapping server: {0}")]
    Bootstrap(#[from] ServerBootstrapError),
    #[error("Error serving requests: {0}")]
    Serve(#[source] HyperError),
}

/// Serves already bound servers concurrently. The first failure stops all of them.
pub async fn serve_all(
    servers: Vec<BoundServer>,
    shutdown: ShutdownSignalReceiver,
) -> Result<(), ServerRunError> {
    try_join_all(
        servers
            .into_iter()
            .map(|server| server.serve(shutdown.clone())),
    )
    .await
    .map(|_| ())
    .map_err(ServerRunError::Serve)
}
