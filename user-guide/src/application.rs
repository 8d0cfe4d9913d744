//! Core application functionality.

use crate::config::{ApplicationConfig, WebConfig};
use crate::controller::{registered_controllers, ControllerPtr};
use crate::router::ControllerRouterBootstrap;
use crate::server::{
    serve_all, shutdown_signal, BoundServer, ServerBootstrapError, ServerRunError, ServerRunner,
};
use config::ConfigError;
use derive_more::Constructor;
use std::future::Future;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Error reading configuration: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Error bootstrapping servers: {0}")]
    BootstrapError(#[from] ServerBootstrapError),
    #[error("Server error: {0}")]
    ServerError(#[from] ServerRunError),
}

/// Main entrypoint for the application. Discovers controllers and runs their servers.
#[derive(Constructor)]
pub struct Application {
    runner: ServerRunner<ControllerRouterBootstrap>,
}

/// Creates an application from configuration files, the environment and all registered
/// controllers.
pub fn create_default() -> Result<Application, ApplicationError> {
    let config = ApplicationConfig::init_from_environment()?;
    if config.install_tracing_logger {
        install_tracing_logger();
    }

    let web_config = WebConfig::init_from_config()?;
    Ok(create_with(web_config, registered_controllers()))
}

/// Creates an application from explicit configuration and controllers.
pub fn create_with(web_config: WebConfig, controllers: Vec<ControllerPtr>) -> Application {
    info!(controllers = controllers.len(), "Creating application...");

    Application::new(ServerRunner::new(
        ControllerRouterBootstrap::new(controllers),
        web_config,
    ))
}

fn install_tracing_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let result = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    if result.is_err() {
        warn!("Tracing logger already installed");
    }
}

impl Application {
    /// Binds all servers without serving requests yet.
    pub fn bind(&self) -> Result<Vec<BoundServer>, ApplicationError> {
        Ok(self.runner.bind()?)
    }

    /// Runs all servers until Ctrl-C is pressed.
    pub async fn run(&self) -> Result<(), ApplicationError> {
        self.run_until(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                warn!(%error, "Cannot listen for shutdown signal");
                futures::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Runs all servers until the given future completes.
    pub async fn run_until<F>(&self, signal: F) -> Result<(), ApplicationError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = shutdown_signal();
        let servers = self.bind()?;

        info!("Running servers...");

        tokio::spawn(async move {
            signal.await;
            info!("Shutting down...");
            let _ = sender.send(());
        });

        Ok(serve_all(servers, receiver).await?)
    }
}
