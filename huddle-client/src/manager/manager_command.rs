use crate::manager::peer_summary::PeerSummary;
use crate::media::{LocalTrack, TrackKind};
use tokio::sync::oneshot;

/// Requests from [`crate::PeerSet`] handles to the manager task.
#[derive(Debug)]
pub(crate) enum ManagerCommand {
    /// Makes `track` the active track of its kind on every link.
    Publish(LocalTrack),

    Unpublish(TrackKind),

    Roster(oneshot::Sender<Vec<PeerSummary>>),

    /// Active local track kinds.
    Published(oneshot::Sender<Vec<TrackKind>>),

    SendMessage(String),

    /// Tear everything down; replies with how many links were released.
    Leave(oneshot::Sender<usize>),
}
