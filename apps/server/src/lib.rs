//! # Sprout Server
//!
//! HTTP front of the early-access registry, built on `Axum` and `axum-server`.
//!
//! ## Example
//! ```no_run
//! use sprout_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(3001)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

pub mod router;

use anyhow::{Context, Result, anyhow};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use sprout::domain::config::ApiConfig;
use sprout::kernel::server::ApiState;
use sprout::storage::Storage;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    fn check_tls_files(&self) -> Result<()> {
        let Some(ssl) = &self.cfg.server.ssl else {
            return Ok(());
        };

        for (what, path) in [("certificate", &ssl.cert), ("private key", &ssl.key)] {
            if !path.is_file() {
                anyhow::bail!("TLS {what} not found at {}", path.display());
            }
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = ssl.key.metadata()?.permissions().mode();
            if mode & 0o077 != 0 {
                tracing::warn!(path = %ssl.key.display(), "TLS private key is readable by group or others");
            }
        }
        Ok(())
    }

    /// Opens the data directory, initializes every feature slice and assembles the
    /// application state.
    ///
    /// # Errors
    /// Fails if the TLS files are missing, the data directory cannot be created, or a
    /// feature refuses to initialize (e.g. a registry path outside the data directory).
    pub async fn build(self) -> Result<Server> {
        self.check_tls_files()?;

        let storage = Storage::builder()
            .root(&self.cfg.storage.data_dir)
            .connect()
            .await
            .context("Failed to open data directory")?;

        let slices = sprout::init(&self.cfg, &storage)
            .map_err(|e| anyhow!("Feature initialization failed: {e}"))?;
        info!(
            data_dir = %storage.root().display(),
            features = ?sprout::features::ENABLED,
            "Feature slices initialized"
        );

        let state = ApiState::builder()
            .config(self.cfg)
            .storage(storage)
            .register_slices(slices)
            .build()
            .context("Failed to assemble API state")?;

        Ok(Server { state })
    }
}

/// A fully initialized server, ready to [`run`](Server::run).
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Serves until SIGINT or SIGTERM, then drains open connections for up to 30 seconds.
    ///
    /// # Errors
    /// Returns an error if the listener cannot bind or the TLS files cannot be loaded.
    pub async fn run(self) -> Result<()> {
        let server = self.state.config.server.clone();
        let address = server.socket_addr();
        let url = format!("{}://{address}", server.scheme());
        let service = router::init(self.state).into_make_service();

        let handle = Handle::<SocketAddr>::new();
        watch_shutdown(handle.clone());

        info!(%url, "Listening");
        let served = match &server.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Failed to load TLS certificate and key")?;
                axum_server::bind_rustls(address, tls).handle(handle).serve(service).await
            },
            None => axum_server::bind(address).handle(handle).serve(service).await,
        };
        served.with_context(|| format!("Server at {url} failed"))?;

        info!("Server stopped");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Starts a graceful shutdown on the first SIGINT or SIGTERM.
fn watch_shutdown(handle: Handle<SocketAddr>) {
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!("Failed to listen for shutdown signals: {e:#}");
            return;
        }
        info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "Shutdown signal received, draining connections");
        handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });
}

async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}
