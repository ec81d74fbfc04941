use crate::error::BusError;
use huddle_core::ClientEvent;
use tokio::sync::mpsc;

/// Outbound half of the signaling connection.
///
/// Inbound [`huddle_core::RelayEvent`]s are delivered on a separate receiver handed to
/// the peer set at spawn; that receiver closing means the connection is gone.
pub trait SignalBus: Send + Sync + 'static {
    /// Queues `event` for the relay. Never waits on the network.
    fn send(&self, event: ClientEvent) -> Result<(), BusError>;
}

/// Bus backed by an in-process channel. Whoever holds the receiver plays the relay.
#[derive(Clone)]
pub struct ChannelBus {
    tx: mpsc::UnboundedSender<ClientEvent>,
}

impl ChannelBus {
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SignalBus for ChannelBus {
    fn send(&self, event: ClientEvent) -> Result<(), BusError> {
        self.tx.send(event).map_err(|_| BusError::Closed)
    }
}
