use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("websocket path must start with '/', got '{0}'")]
    InvalidPath(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("relay server failed: {0}")]
    Serve(#[from] std::io::Error),

    #[error("relay server task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}
