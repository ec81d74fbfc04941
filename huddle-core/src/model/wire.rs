use crate::error::ModelError;
use crate::model::connection::ConnectionId;
use crate::model::member::MemberId;
use crate::model::room::RoomId;
use crate::model::signaling::{IceServerConfig, SignalData, SignalEnvelope};
use serde::{Deserialize, Serialize};

/// Messages a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRoom(RoomId, MemberId),
    LeaveRoom,
    SendMessage(String),
    /// `user_id` names the recipient.
    #[serde(rename_all = "camelCase")]
    Signal { user_id: MemberId, signal: SignalData },
}

/// Messages the relay pushes to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum RelayEvent {
    #[serde(rename_all = "camelCase")]
    Welcome {
        socket_id: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
    },
    /// `initiator` tells the receiver whether it must send the offer to `user_id`.
    #[serde(rename_all = "camelCase")]
    UserConnected {
        user_id: MemberId,
        socket_id: ConnectionId,
        initiator: bool,
    },
    #[serde(rename_all = "camelCase")]
    UserDisconnected {
        user_id: MemberId,
        socket_id: ConnectionId,
    },
    /// `user_id` names the sender.
    #[serde(rename_all = "camelCase")]
    Signal { user_id: MemberId, signal: SignalData },
    #[serde(rename_all = "camelCase")]
    ReceiveMessage { user_id: MemberId, message: String },
}

impl ClientEvent {
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// The relay routes on the recipient only; the sender is stamped on arrival.
impl From<SignalEnvelope> for ClientEvent {
    fn from(envelope: SignalEnvelope) -> Self {
        ClientEvent::Signal {
            user_id: envelope.to,
            signal: envelope.payload,
        }
    }
}

impl RelayEvent {
    pub fn to_json(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }
}
