//! Lazily started file-serving daemon
//!
//! A [`FileServer`] owns a registry and a daemon that moves through
//! `NotStarted → Running → Stopped`. The first registration starts it: the
//! loopback socket is bound on the calling thread so failures surface there,
//! then the listener moves to a dedicated thread running its own tokio
//! runtime, where every connection becomes its own task.

use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::error::ServerError;
use super::routes::{build_router, route_path, RouteState};
use crate::core::config::{ServerConfig, LOOPBACK};
use crate::core::error::Result;
use crate::registry::{FileRegistry, Token};

/// Daemon lifecycle
pub enum DaemonState {
    NotStarted,
    Running(DaemonHandle),
    Stopped,
}

/// Handle to a running daemon thread
pub struct DaemonHandle {
    port: u16,
    shutdown: Option<oneshot::Sender<()>>,
}

impl DaemonHandle {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Ask the daemon to stop accepting connections
    fn signal_shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            // The receiver is gone only if the daemon already exited
            let _ = tx.send(());
        }
    }
}

/// Registry plus its lazily started daemon
pub struct FileServer {
    config: ServerConfig,
    registry: Arc<FileRegistry>,
    state: Mutex<DaemonState>,
}

impl FileServer {
    /// Create a server with the given configuration; nothing is bound yet
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            registry: Arc::new(FileRegistry::new()),
            state: Mutex::new(DaemonState::NotStarted),
        }
    }

    /// Create a server with default configuration
    pub fn with_default_config() -> Self {
        Self::new(ServerConfig::default())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The allow-list consulted by every request
    pub fn registry(&self) -> &Arc<FileRegistry> {
        &self.registry
    }

    /// Register a local file and return a URL the browser client can fetch
    ///
    /// Starts the daemon on first use. Registering the same file again
    /// returns the same URL.
    pub fn register_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let token = self.registry.register(path.as_ref())?;
        let port = self.ensure_running()?;
        Ok(Self::url(port, &token))
    }

    /// Start the daemon if it is not running yet and return its port
    pub fn ensure_running(&self) -> std::result::Result<u16, ServerError> {
        let mut state = self.state.lock();
        match &*state {
            DaemonState::Running(handle) => return Ok(handle.port),
            DaemonState::Stopped => return Err(ServerError::Stopped),
            DaemonState::NotStarted => {}
        }

        let handle = self.spawn_daemon()?;
        let port = handle.port;
        *state = DaemonState::Running(handle);
        Ok(port)
    }

    /// Port of the running daemon, if started
    pub fn port(&self) -> Option<u16> {
        match &*self.state.lock() {
            DaemonState::Running(handle) => Some(handle.port),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(&*self.state.lock(), DaemonState::Running(_))
    }

    /// Public URL for an already minted token, if the daemon is running
    pub fn url_for(&self, token: &Token) -> Option<String> {
        self.port().map(|port| Self::url(port, token))
    }

    /// Router over this server's registry, for mounting in a host application
    ///
    /// Requests reaching the host at `/file/{token}` are answered exactly as the
    /// daemon would answer them.
    pub fn router(&self) -> Router {
        build_router(self.route_state())
    }

    /// Stop the daemon; later registrations fail with [`ServerError::Stopped`]
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        if let DaemonState::Running(handle) = &mut *state {
            handle.signal_shutdown();
            tracing::info!(port = handle.port, "File server shutting down");
        }
        *state = DaemonState::Stopped;
    }

    fn url(port: u16, token: &Token) -> String {
        format!("http://{}:{}{}", LOOPBACK, port, route_path(token.as_str()))
    }

    fn route_state(&self) -> RouteState {
        RouteState {
            registry: Arc::clone(&self.registry),
            chunk_size: self.config.chunk_size,
        }
    }

    fn spawn_daemon(&self) -> std::result::Result<DaemonHandle, ServerError> {
        let addr = SocketAddr::new(LOOPBACK, self.config.port);
        let bind_failed = |e: std::io::Error| ServerError::BindFailed {
            reason: format!("{}: {}", addr, e),
        };

        let listener = TcpListener::bind(addr).map_err(bind_failed)?;
        listener.set_nonblocking(true).map_err(bind_failed)?;
        let port = listener.local_addr().map_err(bind_failed)?.port();

        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder
            .enable_all()
            .thread_name(format!("{}-worker", self.config.thread_name));
        if let Some(threads) = self.config.worker_threads {
            builder.worker_threads(threads);
        }
        let runtime = builder.build().map_err(|e| ServerError::Runtime {
            reason: e.to_string(),
        })?;

        let router = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        // Detached: in-flight transfers finish on their own after shutdown
        std::thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || runtime.block_on(serve(listener, router, shutdown_rx)))
            .map_err(|e| ServerError::Runtime {
                reason: e.to_string(),
            })?;

        tracing::info!("File server listening on http://{}:{}", LOOPBACK, port);

        Ok(DaemonHandle {
            port,
            shutdown: Some(shutdown_tx),
        })
    }
}

impl Drop for FileServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Accept loop; runs until the shutdown signal fires or its sender is dropped
async fn serve(listener: TcpListener, router: Router, shutdown: oneshot::Receiver<()>) {
    let listener = match tokio::net::TcpListener::from_std(listener) {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("File server could not adopt listener: {}", e);
            return;
        }
    };

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
        })
        .await;

    if let Err(e) = result {
        tracing::error!("File server stopped with error: {}", e);
    }
}
