use crate::media::TrackKind;
use huddle_core::{MemberId, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("signaling connection is closed")]
    Closed,

    #[error("could not reach relay at {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error(transparent)]
    Codec(#[from] ModelError),
}

/// Camera, microphone or display capture could not be obtained.
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    #[error("{0:?} capture was denied")]
    Denied(TrackKind),

    #[error("{kind:?} capture unavailable: {reason}")]
    Unavailable { kind: TrackKind, reason: String },
}

/// Failure confined to a single peer link.
#[derive(Debug, Clone, Error)]
pub enum LinkError {
    #[error("transport setup for {member} failed: {reason}")]
    Setup { member: MemberId, reason: String },

    #[error("{step} with {member} failed: {reason}")]
    Negotiation {
        member: MemberId,
        step: &'static str,
        reason: String,
    },
}

impl LinkError {
    pub fn member(&self) -> &MemberId {
        match self {
            LinkError::Setup { member, .. } | LinkError::Negotiation { member, .. } => member,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("peer set is no longer running")]
    Stopped,
}
