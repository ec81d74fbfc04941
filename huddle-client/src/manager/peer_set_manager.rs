use crate::bus::SignalBus;
use crate::error::LinkError;
use crate::manager::manager_command::ManagerCommand;
use crate::manager::peer_observer::PeerObserver;
use crate::manager::peer_summary::PeerSummary;
use crate::media::{LocalTrack, RemoteTrack, TrackKind};
use crate::peer::{
    LinkEvent, LinkInput, LinkKey, NegotiationState, PeerLink, PeerTransport, Role,
    TransportFactory, TransportState,
};
use huddle_core::{ClientEvent, IceServerConfig, MemberId, RelayEvent, RoomId, SignalData};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct LinkHandle {
    key: LinkKey,
    role: Role,
    negotiation: NegotiationState,
    transport_state: TransportState,
    transport: Arc<dyn PeerTransport>,
    inbox: mpsc::UnboundedSender<LinkInput>,
    task: JoinHandle<()>,
    remote_tracks: Vec<RemoteTrack>,
}

impl LinkHandle {
    fn send(&self, input: LinkInput) {
        if self.inbox.send(input).is_err() {
            debug!("Link {} is gone, input dropped", self.key);
        }
    }

    fn summary(&self) -> PeerSummary {
        PeerSummary {
            member: self.key.member.clone(),
            role: self.role,
            negotiation: self.negotiation,
            transport: self.transport_state,
            remote_tracks: self.remote_tracks.iter().map(|t| t.kind).collect(),
        }
    }
}

/// Owns every peer link of one local member in one room.
///
/// All link bookkeeping happens on this task; negotiation itself runs on the
/// per-link tasks so one slow peer never holds up the others.
pub(crate) struct PeerSetManager {
    local: MemberId,
    room: RoomId,
    bus: Arc<dyn SignalBus>,
    factory: Arc<dyn TransportFactory>,
    observer: Arc<dyn PeerObserver>,
    ice_servers: Vec<IceServerConfig>,

    links: HashMap<MemberId, LinkHandle>,
    published: BTreeMap<TrackKind, LocalTrack>,
    next_generation: u64,

    relay_rx: mpsc::UnboundedReceiver<RelayEvent>,
    command_rx: mpsc::Receiver<ManagerCommand>,
    event_rx: mpsc::UnboundedReceiver<LinkEvent>,
    event_tx: mpsc::UnboundedSender<LinkEvent>,
}

pub(crate) struct ManagerParts {
    pub local: MemberId,
    pub room: RoomId,
    pub bus: Arc<dyn SignalBus>,
    pub relay_rx: mpsc::UnboundedReceiver<RelayEvent>,
    pub factory: Arc<dyn TransportFactory>,
    pub observer: Arc<dyn PeerObserver>,
    pub ice_servers: Vec<IceServerConfig>,
}

impl PeerSetManager {
    pub(crate) fn new(parts: ManagerParts, command_rx: mpsc::Receiver<ManagerCommand>) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            local: parts.local,
            room: parts.room,
            bus: parts.bus,
            factory: parts.factory,
            observer: parts.observer,
            ice_servers: parts.ice_servers,
            links: HashMap::new(),
            published: BTreeMap::new(),
            next_generation: 0,
            relay_rx: parts.relay_rx,
            command_rx,
            event_rx,
            event_tx,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("{} joining room {}", self.local, self.room);
        if let Err(e) = self
            .bus
            .send(ClientEvent::JoinRoom(self.room.clone(), self.local.clone()))
        {
            warn!("Could not send join for {}: {}", self.local, e);
        }

        loop {
            tokio::select! {
                event = self.relay_rx.recv() => {
                    let Some(event) = event else {
                        info!("Signaling connection for {} closed", self.local);
                        self.release_all().await;
                        self.observer.on_disconnected().await;
                        break;
                    };
                    self.handle_relay_event(event).await;
                }

                command = self.command_rx.recv() => {
                    match command {
                        Some(ManagerCommand::Leave(reply)) => {
                            let released = self.leave().await;
                            let _ = reply.send(released);
                            break;
                        }
                        Some(command) => self.handle_command(command).await,
                        None => {
                            self.leave().await;
                            break;
                        }
                    }
                }

                Some(event) = self.event_rx.recv() => {
                    self.handle_link_event(event).await;
                }
            }
        }

        info!("Peer set for {} stopped", self.local);
    }

    async fn handle_relay_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::Welcome {
                socket_id,
                ice_servers,
            } => {
                debug!("Relay assigned connection {}", socket_id);
                if !ice_servers.is_empty() {
                    self.ice_servers = ice_servers;
                }
            }

            RelayEvent::UserConnected {
                user_id, initiator, ..
            } => {
                if user_id == self.local {
                    return;
                }
                if self.links.contains_key(&user_id) {
                    debug!("Already linked with {}, ignoring join", user_id);
                    return;
                }

                let role = Role::from_initiator_flag(initiator);
                if self.open_link(user_id.clone(), role).await && role == Role::Initiator {
                    if let Some(link) = self.links.get(&user_id) {
                        link.send(LinkInput::Start);
                    }
                }
            }

            RelayEvent::UserDisconnected { user_id, .. } => {
                if !self.release(&user_id).await {
                    debug!("No link with {}, nothing to release", user_id);
                }
            }

            RelayEvent::Signal { user_id, signal } => self.route_signal(user_id, signal).await,

            RelayEvent::ReceiveMessage { user_id, message } => {
                self.observer.on_message(&user_id, &message).await;
            }
        }
    }

    async fn route_signal(&mut self, from: MemberId, signal: SignalData) {
        if !self.links.contains_key(&from) {
            match signal {
                // Offer from someone whose join notice has not reached us yet.
                SignalData::Offer { .. } => {
                    if !self.open_link(from.clone(), Role::Responder).await {
                        return;
                    }
                }
                other => {
                    debug!("Dropping {} from unknown member {}", other.kind(), from);
                    return;
                }
            }
        }

        if let Some(link) = self.links.get(&from) {
            link.send(LinkInput::Signal(signal));
        }
    }

    async fn open_link(&mut self, member: MemberId, role: Role) -> bool {
        let key = LinkKey {
            member: member.clone(),
            generation: self.next_generation,
        };
        self.next_generation += 1;

        let transport = match self
            .factory
            .create(&key, &self.ice_servers, self.event_tx.clone())
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                let error = LinkError::Setup {
                    member,
                    reason: format!("{e:#}"),
                };
                warn!("{}", error);
                self.observer.on_link_failed(&error).await;
                return false;
            }
        };

        let (inbox, inbox_rx) = mpsc::unbounded_channel();
        let link = PeerLink::new(
            key.clone(),
            self.local.clone(),
            role,
            transport.clone(),
            self.bus.clone(),
            self.event_tx.clone(),
        );
        let tracks = self.published.values().cloned().collect();
        let task = tokio::spawn(link.run(tracks, inbox_rx));

        info!("Link {} opened as {:?}", key, role);
        self.links.insert(
            member.clone(),
            LinkHandle {
                key,
                role,
                negotiation: NegotiationState::New,
                transport_state: TransportState::New,
                transport,
                inbox,
                task,
                remote_tracks: Vec::new(),
            },
        );

        self.observer.on_peer_joined(&member, role).await;
        true
    }

    async fn release(&mut self, member: &MemberId) -> bool {
        let Some(handle) = self.links.remove(member) else {
            return false;
        };
        self.shut(handle).await;
        self.observer.on_peer_left(member).await;
        true
    }

    async fn release_all(&mut self) -> usize {
        let members: Vec<MemberId> = self.links.keys().cloned().collect();
        for member in &members {
            self.release(member).await;
        }
        members.len()
    }

    async fn shut(&self, handle: LinkHandle) {
        // The task may be mid-poll on another worker; only its completion
        // guarantees it sends nothing more.
        handle.task.abort();
        let _ = handle.task.await;
        if let Err(e) = handle.transport.close().await {
            debug!("Closing link {}: {:#}", handle.key, e);
        }
        info!("Link {} released", handle.key);
    }

    async fn leave(&mut self) -> usize {
        let released = self.release_all().await;
        if let Err(e) = self.bus.send(ClientEvent::LeaveRoom) {
            debug!("Leave not delivered: {}", e);
        }
        info!(
            "{} left room {}, released {} links",
            self.local, self.room, released
        );
        released
    }

    async fn handle_command(&mut self, command: ManagerCommand) {
        match command {
            ManagerCommand::Publish(track) => {
                let kind = track.kind();
                if let Some(previous) = self.published.insert(kind, track.clone()) {
                    if previous.id() != track.id() {
                        self.broadcast(|| LinkInput::DetachTrack(previous.id().clone()));
                    }
                }
                info!("Publishing {} track {}", kind, track.id());
                self.broadcast(|| LinkInput::AttachTrack(track.clone()));
            }

            ManagerCommand::Unpublish(kind) => {
                if let Some(previous) = self.published.remove(&kind) {
                    info!("Stopped publishing {} track {}", kind, previous.id());
                    self.broadcast(|| LinkInput::DetachTrack(previous.id().clone()));
                }
            }

            ManagerCommand::Roster(reply) => {
                let mut roster: Vec<PeerSummary> =
                    self.links.values().map(LinkHandle::summary).collect();
                roster.sort_by(|a, b| a.member.cmp(&b.member));
                let _ = reply.send(roster);
            }

            ManagerCommand::Published(reply) => {
                let _ = reply.send(self.published.keys().copied().collect());
            }

            ManagerCommand::SendMessage(message) => {
                if let Err(e) = self.bus.send(ClientEvent::SendMessage(message)) {
                    warn!("Chat message not sent: {}", e);
                }
            }

            ManagerCommand::Leave(_) => {}
        }
    }

    fn broadcast<F>(&self, input: F)
    where
        F: Fn() -> LinkInput,
    {
        for link in self.links.values() {
            link.send(input());
        }
    }

    async fn handle_link_event(&mut self, event: LinkEvent) {
        let Some(link) = self.links.get_mut(&event.key().member) else {
            debug!("Event for released link {}", event.key());
            return;
        };
        if &link.key != event.key() {
            debug!("Event for superseded link {}", event.key());
            return;
        }

        match event {
            LinkEvent::Negotiation(_, state) => link.negotiation = state,

            LinkEvent::Failed(_, error) => {
                link.negotiation = NegotiationState::Closed;
                self.observer.on_link_failed(&error).await;
            }

            LinkEvent::CandidateGenerated(_, candidate) => {
                if link.negotiation != NegotiationState::Closed {
                    link.send(LinkInput::LocalCandidate(candidate));
                }
            }

            LinkEvent::TransportState(key, state) => {
                if state == TransportState::Failed {
                    warn!("Transport for {} failed", key);
                }
                link.transport_state = state;
            }

            LinkEvent::RemoteTrack(key, track) => {
                link.remote_tracks.push(track.clone());
                self.observer.on_track(&key.member, track).await;
            }
        }
    }
}
