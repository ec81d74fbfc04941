use crate::error::{LinkError, MediaError};
use crate::media::RemoteTrack;
use crate::peer::Role;
use async_trait::async_trait;
use huddle_core::MemberId;

/// Application hooks for what happens in the room. Every method defaults to a no-op.
///
/// Called from the peer set's own task; keep implementations short.
#[async_trait]
pub trait PeerObserver: Send + Sync + 'static {
    async fn on_peer_joined(&self, _member: &MemberId, _role: Role) {}

    async fn on_track(&self, _member: &MemberId, _track: RemoteTrack) {}

    async fn on_peer_left(&self, _member: &MemberId) {}

    async fn on_link_failed(&self, _error: &LinkError) {}

    async fn on_message(&self, _member: &MemberId, _message: &str) {}

    async fn on_media_error(&self, _error: &MediaError) {}

    /// The signaling connection is gone and every link has been released.
    async fn on_disconnected(&self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PeerObserver for NoopObserver {}
