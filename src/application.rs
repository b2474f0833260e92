use crate::config::{GatewayConfig, Settings};
use crate::proxy::GatewayService;
use crate::Result;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Main application struct that coordinates all components
pub struct Application {
    settings: Settings,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Load settings from the environment and bind the listener
    #[instrument]
    pub async fn new() -> Result<Self> {
        Self::build(Settings::new()?).await
    }

    /// Validate `settings`, build the gateway and bind its listener
    #[instrument(skip(settings))]
    pub async fn build(settings: Settings) -> Result<Self> {
        let gateway_config = GatewayConfig::from_settings(&settings)?;
        let router = GatewayService::new(&gateway_config)?.into_router();

        let listener = TcpListener::bind(settings.bind_address()).await?;
        info!(
            address = %settings.bind_address(),
            private_keys = gateway_config.private_keys.len(),
            "Listener bound"
        );

        Ok(Self {
            settings,
            listener,
            router,
        })
    }

    /// Address actually bound, useful when the configured port is `0`
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        info!(
            "Starting manifest gateway on {}:{}",
            self.settings.application.host, self.settings.application.port
        );

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
