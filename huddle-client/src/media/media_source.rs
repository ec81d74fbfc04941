use crate::error::MediaError;
use crate::media::track::{LocalTrack, TrackKind};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Where local capture comes from (camera, microphone, screen, or something synthetic).
#[async_trait]
pub trait MediaSource: Send + Sync + 'static {
    async fn acquire(&self, kind: TrackKind) -> Result<LocalTrack, MediaError>;
}

/// Hands out sample-fed tracks. The application writes frames into the writer
/// returned by [`SampleTrackSource::writer`].
pub struct SampleTrackSource {
    stream_id: String,
    denied: HashSet<TrackKind>,
    writers: DashMap<TrackKind, Arc<TrackLocalStaticSample>>,
}

impl SampleTrackSource {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            denied: HashSet::new(),
            writers: DashMap::new(),
        }
    }

    /// Refuse captures of `kind`, as a user declining a permission prompt would.
    pub fn deny(mut self, kind: TrackKind) -> Self {
        self.denied.insert(kind);
        self
    }

    /// Writer of the most recently acquired track of `kind`.
    pub fn writer(&self, kind: TrackKind) -> Option<Arc<TrackLocalStaticSample>> {
        self.writers.get(&kind).map(|w| w.value().clone())
    }
}

#[async_trait]
impl MediaSource for SampleTrackSource {
    async fn acquire(&self, kind: TrackKind) -> Result<LocalTrack, MediaError> {
        if self.denied.contains(&kind) {
            return Err(MediaError::Denied(kind));
        }

        let (track, writer) = LocalTrack::sample(kind, &self.stream_id);
        debug!("Acquired {} track {}", kind, track.id());
        self.writers.insert(kind, writer);
        Ok(track)
    }
}
