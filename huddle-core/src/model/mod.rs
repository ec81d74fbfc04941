mod connection;
mod member;
mod room;
mod signaling;
mod wire;

pub use connection::ConnectionId;
pub use member::MemberId;
pub use room::RoomId;
pub use signaling::{IceCandidate, IceServerConfig, SignalData, SignalEnvelope};
pub use wire::{ClientEvent, RelayEvent};
