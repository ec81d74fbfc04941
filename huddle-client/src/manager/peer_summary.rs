use crate::media::TrackKind;
use crate::peer::{NegotiationState, Role, TransportState};
use huddle_core::MemberId;

/// Snapshot of one link, as returned by [`crate::PeerSet::roster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSummary {
    pub member: MemberId,
    pub role: Role,
    pub negotiation: NegotiationState,
    pub transport: TransportState,
    pub remote_tracks: Vec<TrackKind>,
}
