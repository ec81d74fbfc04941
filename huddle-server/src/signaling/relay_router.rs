use crate::room::{RoomMember, RoomRegistry};
use dashmap::DashMap;
use huddle_core::{
    ClientEvent, ConnectionId, IceServerConfig, MemberId, RelayEvent, RoomId, SignalData,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Room a connection has joined, and under which member id.
#[derive(Debug, Clone)]
struct Session {
    room_id: RoomId,
    member: RoomMember,
}

struct RouterInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<RelayEvent>>,
    sessions: DashMap<ConnectionId, Session>,
    registry: RoomRegistry,
    ice_servers: Vec<IceServerConfig>,
}

/// Forwards membership notices and signal envelopes between the members of a room.
/// Never looks inside a signal payload.
#[derive(Clone)]
pub struct RelayRouter {
    inner: Arc<RouterInner>,
}

impl RelayRouter {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self::with_registry(RoomRegistry::new(), ice_servers)
    }

    pub fn with_registry(registry: RoomRegistry, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(RouterInner {
                connections: DashMap::new(),
                sessions: DashMap::new(),
                registry,
                ice_servers,
            }),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.inner.registry
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    /// Registers a new transport connection and greets it with its socket id.
    pub fn connect(&self, tx: mpsc::UnboundedSender<RelayEvent>) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.inner.connections.insert(connection_id, tx);

        self.deliver(
            &connection_id,
            RelayEvent::Welcome {
                socket_id: connection_id,
                ice_servers: self.inner.ice_servers.clone(),
            },
        );

        connection_id
    }

    /// Single entry point for everything a connection sends.
    pub async fn dispatch(&self, connection_id: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::JoinRoom(room_id, member_id) => {
                self.join(connection_id, room_id, member_id).await
            }
            ClientEvent::LeaveRoom => self.leave(&connection_id).await,
            ClientEvent::Signal { user_id, signal } => {
                self.forward_signal(&connection_id, user_id, signal).await
            }
            ClientEvent::SendMessage(message) => {
                self.broadcast_message(&connection_id, message).await
            }
        }
    }

    /// Transport went away: implicit leave.
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        self.inner.connections.remove(&connection_id);
        self.leave(&connection_id).await;
    }

    /// Drops every outbound channel, which ends each connection's writer.
    pub fn close_all(&self) {
        self.inner.connections.clear();
    }

    async fn join(&self, connection_id: ConnectionId, room_id: RoomId, member_id: MemberId) {
        if !self.inner.connections.contains_key(&connection_id) {
            debug!("Join from unknown connection {}, ignoring", connection_id);
            return;
        }

        self.leave(&connection_id).await;

        info!(
            "Member {} joins room '{}' from {}",
            member_id, room_id, connection_id
        );

        let member = RoomMember::new(member_id, connection_id);
        let outcome = self
            .inner
            .registry
            .join_with(&room_id, member.clone(), |joiner, outcome| {
                if let Some(stale) = &outcome.evicted {
                    info!(
                        "Member {} rejoined from a new connection, dropping {}",
                        stale.member_id, stale.connection_id
                    );
                    self.inner.sessions.remove(&stale.connection_id);
                    for peer in &outcome.previous {
                        self.deliver(
                            &peer.connection_id,
                            RelayEvent::UserDisconnected {
                                user_id: stale.member_id.clone(),
                                socket_id: stale.connection_id,
                            },
                        );
                        // The stale connection is out of the room and sees everyone leave.
                        self.deliver(
                            &stale.connection_id,
                            RelayEvent::UserDisconnected {
                                user_id: peer.member_id.clone(),
                                socket_id: peer.connection_id,
                            },
                        );
                    }
                }

                for peer in &outcome.previous {
                    // Whoever was already here makes the offer.
                    self.deliver(
                        &peer.connection_id,
                        RelayEvent::UserConnected {
                            user_id: joiner.member_id.clone(),
                            socket_id: joiner.connection_id,
                            initiator: true,
                        },
                    );
                    self.deliver(
                        &joiner.connection_id,
                        RelayEvent::UserConnected {
                            user_id: peer.member_id.clone(),
                            socket_id: peer.connection_id,
                            initiator: false,
                        },
                    );
                }

                self.inner.sessions.insert(
                    connection_id,
                    Session {
                        room_id: room_id.clone(),
                        member: joiner.clone(),
                    },
                );
            })
            .await;

        debug!(
            "Room '{}' now has {} member(s)",
            room_id,
            outcome.previous.len() + 1
        );
    }

    async fn leave(&self, connection_id: &ConnectionId) {
        let Some((_, session)) = self.inner.sessions.remove(connection_id) else {
            return;
        };

        let outcome = self
            .inner
            .registry
            .leave_with(&session.room_id, &session.member, |outcome| {
                let Some(removed) = &outcome.removed else {
                    return;
                };
                for peer in &outcome.remaining {
                    self.deliver(
                        &peer.connection_id,
                        RelayEvent::UserDisconnected {
                            user_id: removed.member_id.clone(),
                            socket_id: removed.connection_id,
                        },
                    );
                }
            })
            .await;

        if outcome.removed.is_some() {
            info!(
                "Member {} left room '{}' ({} remaining)",
                session.member.member_id,
                session.room_id,
                outcome.remaining.len()
            );
        }
    }

    async fn forward_signal(&self, connection_id: &ConnectionId, to: MemberId, signal: SignalData) {
        let Some(session) = self.session(connection_id) else {
            debug!(
                "Dropping {} from {}: connection has not joined a room",
                signal.kind(),
                connection_id
            );
            return;
        };

        let from = session.member.member_id;
        if from == to {
            warn!("Member {} tried to signal itself, dropping", from);
            return;
        }

        let kind = signal.kind();
        let delivered = self
            .inner
            .registry
            .with_members(&session.room_id, |members| {
                let Some(target) = members.iter().find(|m| m.member_id == to) else {
                    return false;
                };
                self.deliver(
                    &target.connection_id,
                    RelayEvent::Signal {
                        user_id: from.clone(),
                        signal,
                    },
                )
            })
            .await
            .unwrap_or(false);

        if !delivered {
            // The target already left; an expected race, not an error.
            debug!("Dropping {} from {} to absent member {}", kind, from, to);
        }
    }

    async fn broadcast_message(&self, connection_id: &ConnectionId, message: String) {
        let Some(session) = self.session(connection_id) else {
            debug!("Dropping chat message from {}: not in a room", connection_id);
            return;
        };

        let from = session.member;
        self.inner
            .registry
            .with_members(&session.room_id, |members| {
                for peer in members.iter().filter(|m| **m != from) {
                    self.deliver(
                        &peer.connection_id,
                        RelayEvent::ReceiveMessage {
                            user_id: from.member_id.clone(),
                            message: message.clone(),
                        },
                    );
                }
            })
            .await;
    }

    fn session(&self, connection_id: &ConnectionId) -> Option<Session> {
        self.inner
            .sessions
            .get(connection_id)
            .map(|s| s.value().clone())
    }

    fn deliver(&self, connection_id: &ConnectionId, event: RelayEvent) -> bool {
        let Some(tx) = self.inner.connections.get(connection_id) else {
            debug!("Connection {} is gone, dropping event", connection_id);
            return false;
        };
        if tx.send(event).is_err() {
            debug!("Connection {} writer closed, dropping event", connection_id);
            return false;
        }
        true
    }
}
