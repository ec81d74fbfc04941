use crate::identity::{SessionStore, load_member_id};
use huddle_core::utils::default_ice_servers;
use huddle_core::{IceServerConfig, MemberId, ModelError, RoomId};

/// Peer set tuning.
#[derive(Debug, Clone)]
pub struct PeerSetConfig {
    /// Used until the relay's welcome names its own servers.
    pub ice_servers: Vec<IceServerConfig>,
    pub command_buffer: usize,
}

impl Default for PeerSetConfig {
    fn default() -> Self {
        Self {
            ice_servers: default_ice_servers(),
            command_buffer: 64,
        }
    }
}

/// Where to connect and as whom.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url: String,
    pub room: RoomId,
    pub member: MemberId,
}

impl ClientConfig {
    /// Room from the last segment of `page_url`, member id from the session.
    pub fn from_page_url(
        url: impl Into<String>,
        page_url: &str,
        store: &dyn SessionStore,
    ) -> Result<Self, ModelError> {
        Ok(Self {
            url: url.into(),
            room: RoomId::from_url_path(page_url)?,
            member: load_member_id(store),
        })
    }
}
