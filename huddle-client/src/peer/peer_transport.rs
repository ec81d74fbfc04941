use crate::media::{LocalTrack, TrackId};
use crate::peer::link_event::LinkEvent;
use crate::peer::negotiation::LinkKey;
use anyhow::Result;
use async_trait::async_trait;
use huddle_core::{IceCandidate, IceServerConfig};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The media/connectivity engine behind one peer link.
///
/// Description methods operate on the engine's own description state:
/// `create_offer` and `create_answer` also install the result as the local description.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<String>;

    async fn create_answer(&self) -> Result<String>;

    async fn set_remote_offer(&self, sdp: String) -> Result<()>;

    async fn set_remote_answer(&self, sdp: String) -> Result<()>;

    /// Discards a local offer that has not been answered.
    async fn rollback(&self) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Returns whether the track was newly added.
    async fn attach_track(&self, track: &LocalTrack) -> Result<bool>;

    /// Returns whether a track was actually removed.
    async fn detach_track(&self, track_id: &TrackId) -> Result<bool>;

    async fn close(&self) -> Result<()>;
}

/// Creates one transport per link. Transports push their events into `events`.
#[async_trait]
pub trait TransportFactory: Send + Sync + 'static {
    async fn create(
        &self,
        key: &LinkKey,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Result<Arc<dyn PeerTransport>>;
}
