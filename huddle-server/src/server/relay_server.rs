use crate::error::RelayError;
use crate::server::RelayConfig;
use crate::signaling::{RelayRouter, ws_handler};
use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// A running relay. Owns its listener task; stop it with [`RelayServer::shutdown`].
pub struct RelayServer {
    local_addr: SocketAddr,
    router: RelayRouter,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl RelayServer {
    /// Axum app serving the signaling endpoint at `ws_path`.
    pub fn app(router: RelayRouter, config: &RelayConfig) -> Router {
        Router::new()
            .route(&config.ws_path, get(ws_handler))
            .with_state(router)
    }

    pub async fn start(config: RelayConfig) -> Result<Self, RelayError> {
        config.validate()?;

        let router = RelayRouter::new(config.ice_servers.clone());
        let app = Self::app(router.clone(), &config);

        let listener = tokio::net::TcpListener::bind(config.bind)
            .await
            .map_err(|source| RelayError::Bind {
                addr: config.bind,
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(
            "Signaling relay listening on ws://{}{}",
            local_addr, config.ws_path
        );

        Ok(Self {
            local_addr,
            router,
            shutdown_tx,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn router(&self) -> &RelayRouter {
        &self.router
    }

    /// Stops accepting connections and closes every open signaling socket.
    pub async fn shutdown(self) -> Result<(), RelayError> {
        info!("Shutting down relay on {}", self.local_addr);

        let _ = self.shutdown_tx.send(());
        self.router.close_all();
        self.task.await??;

        info!("Relay stopped");
        Ok(())
    }

    /// Runs until the listener fails or `signal` resolves.
    pub async fn run_until<F>(self, signal: F) -> Result<(), RelayError>
    where
        F: Future<Output = ()>,
    {
        let mut task = self.task;
        let finished = tokio::select! {
            res = &mut task => Some(res),
            _ = signal => None,
        };

        match finished {
            Some(res) => {
                res??;
                Ok(())
            }
            None => Self { task, ..self }.shutdown().await,
        }
    }
}
