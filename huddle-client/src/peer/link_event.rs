use crate::error::LinkError;
use crate::media::RemoteTrack;
use crate::peer::negotiation::{LinkKey, NegotiationState, TransportState};
use huddle_core::IceCandidate;

/// Everything links and their transports report back to the peer set.
#[derive(Debug)]
pub enum LinkEvent {
    /// The link moved to a new negotiation state.
    Negotiation(LinkKey, NegotiationState),

    /// Negotiation could not continue; the link is closed.
    Failed(LinkKey, LinkError),

    /// A local ICE candidate that has to reach the remote member.
    CandidateGenerated(LinkKey, IceCandidate),

    TransportState(LinkKey, TransportState),

    RemoteTrack(LinkKey, RemoteTrack),
}

impl LinkEvent {
    pub fn key(&self) -> &LinkKey {
        match self {
            LinkEvent::Negotiation(key, _)
            | LinkEvent::Failed(key, _)
            | LinkEvent::CandidateGenerated(key, _)
            | LinkEvent::TransportState(key, _)
            | LinkEvent::RemoteTrack(key, _) => key,
        }
    }
}
