use crate::error::RelayError;
use huddle_core::IceServerConfig;
use huddle_core::utils::{DEFAULT_WS_PATH, default_ice_servers};
use std::net::{Ipv4Addr, SocketAddr};

/// Settings for a relay instance.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    pub ws_path: String,
    /// Advertised to every client in its `welcome`; the relay never runs them.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 3000)),
            ws_path: DEFAULT_WS_PATH.to_owned(),
            ice_servers: default_ice_servers(),
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<(), RelayError> {
        if !self.ws_path.starts_with('/') {
            return Err(RelayError::InvalidPath(self.ws_path.clone()));
        }
        Ok(())
    }
}
