use crate::bus::SignalBus;
use crate::config::PeerSetConfig;
use crate::error::{ClientError, MediaError};
use crate::manager::manager_command::ManagerCommand;
use crate::manager::peer_observer::{NoopObserver, PeerObserver};
use crate::manager::peer_set_manager::{ManagerParts, PeerSetManager};
use crate::manager::peer_summary::PeerSummary;
use crate::media::{LocalTrack, MediaSource, SampleTrackSource, TrackKind};
use crate::peer::TransportFactory;
use huddle_core::{MemberId, RelayEvent, RoomId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Assembles and spawns a [`PeerSet`].
pub struct PeerSetBuilder {
    local: MemberId,
    room: RoomId,
    factory: Arc<dyn TransportFactory>,
    observer: Arc<dyn PeerObserver>,
    media: Option<Arc<dyn MediaSource>>,
    config: PeerSetConfig,
}

impl PeerSetBuilder {
    pub fn new(local: MemberId, room: RoomId, factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            local,
            room,
            factory,
            observer: Arc::new(NoopObserver),
            media: None,
            config: PeerSetConfig::default(),
        }
    }

    pub fn observer(mut self, observer: Arc<dyn PeerObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn media_source(mut self, media: Arc<dyn MediaSource>) -> Self {
        self.media = Some(media);
        self
    }

    pub fn config(mut self, config: PeerSetConfig) -> Self {
        self.config = config;
        self
    }

    /// Spawns the manager task and joins the room over `bus`.
    ///
    /// `inbound` is the bus's event stream; when it ends the peer set tears down.
    pub fn spawn(
        self,
        bus: Arc<dyn SignalBus>,
        inbound: mpsc::UnboundedReceiver<RelayEvent>,
    ) -> PeerSet {
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer.max(1));
        let media = self.media.unwrap_or_else(|| {
            Arc::new(SampleTrackSource::new(self.local.to_string())) as Arc<dyn MediaSource>
        });

        let manager = PeerSetManager::new(
            ManagerParts {
                local: self.local.clone(),
                room: self.room.clone(),
                bus,
                relay_rx: inbound,
                factory: self.factory,
                observer: self.observer.clone(),
                ice_servers: self.config.ice_servers,
            },
            command_rx,
        );
        tokio::spawn(manager.run());

        PeerSet {
            local: self.local,
            room: self.room,
            command_tx,
            media,
            observer: self.observer,
        }
    }
}

/// Handle to a running peer set. Cheap to clone.
#[derive(Clone)]
pub struct PeerSet {
    local: MemberId,
    room: RoomId,
    command_tx: mpsc::Sender<ManagerCommand>,
    media: Arc<dyn MediaSource>,
    observer: Arc<dyn PeerObserver>,
}

impl PeerSet {
    pub fn builder(
        local: MemberId,
        room: RoomId,
        factory: Arc<dyn TransportFactory>,
    ) -> PeerSetBuilder {
        PeerSetBuilder::new(local, room, factory)
    }

    pub fn local(&self) -> &MemberId {
        &self.local
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// Captures a track of `kind` and publishes it to every link,
    /// replacing any active track of the same kind.
    pub async fn enable(&self, kind: TrackKind) -> Result<(), ClientError> {
        let track = match self.media.acquire(kind).await {
            Ok(track) => track,
            Err(e) => return Err(self.media_failed(e).await),
        };
        self.publish(track).await
    }

    pub async fn disable(&self, kind: TrackKind) -> Result<(), ClientError> {
        self.command(ManagerCommand::Unpublish(kind)).await
    }

    /// Publishes an already captured track.
    pub async fn publish(&self, track: LocalTrack) -> Result<(), ClientError> {
        self.command(ManagerCommand::Publish(track)).await
    }

    pub async fn published(&self) -> Result<Vec<TrackKind>, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.command(ManagerCommand::Published(tx)).await?;
        rx.await.map_err(|_| ClientError::Stopped)
    }

    /// One entry per link, ordered by member id.
    pub async fn roster(&self) -> Result<Vec<PeerSummary>, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.command(ManagerCommand::Roster(tx)).await?;
        rx.await.map_err(|_| ClientError::Stopped)
    }

    pub async fn send_message(&self, message: impl Into<String>) -> Result<(), ClientError> {
        self.command(ManagerCommand::SendMessage(message.into()))
            .await
    }

    /// Releases every link, leaves the room and stops the peer set.
    /// Returns the number of links released.
    pub async fn leave(&self) -> Result<usize, ClientError> {
        let (tx, rx) = oneshot::channel();
        self.command(ManagerCommand::Leave(tx)).await?;
        rx.await.map_err(|_| ClientError::Stopped)
    }

    pub fn is_running(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Resolves once the peer set has stopped, by leaving or by losing the relay.
    pub async fn stopped(&self) {
        self.command_tx.closed().await
    }

    async fn command(&self, command: ManagerCommand) -> Result<(), ClientError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| ClientError::Stopped)
    }

    async fn media_failed(&self, error: MediaError) -> ClientError {
        warn!("Media capture failed for {}: {}", self.local, error);
        self.observer.on_media_error(&error).await;
        error.into()
    }
}
