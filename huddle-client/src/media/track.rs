use std::fmt;
use std::sync::Arc;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

const SCREEN_PREFIX: &str = "screen";

/// Local capture slot. At most one track per kind is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackKind {
    Audio,
    Video,
    Screen,
}

impl TrackKind {
    pub const ALL: [TrackKind; 3] = [TrackKind::Audio, TrackKind::Video, TrackKind::Screen];

    pub fn codec_type(self) -> RTPCodecType {
        match self {
            TrackKind::Audio => RTPCodecType::Audio,
            TrackKind::Video | TrackKind::Screen => RTPCodecType::Video,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
            TrackKind::Screen => SCREEN_PREFIX,
        }
    }

    /// Screen shares travel as plain video; they are told apart by their track id.
    pub fn classify(codec: RTPCodecType, track_id: &str) -> Option<Self> {
        match codec {
            RTPCodecType::Audio => Some(TrackKind::Audio),
            RTPCodecType::Video if track_id.starts_with(SCREEN_PREFIX) => Some(TrackKind::Screen),
            RTPCodecType::Video => Some(TrackKind::Video),
            _ => None,
        }
    }

    fn codec_capability(self) -> RTCRtpCodecCapability {
        match self {
            TrackKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            TrackKind::Video | TrackKind::Screen => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackId(pub String);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A captured track ready to be attached to peer links.
#[derive(Clone)]
pub struct LocalTrack {
    id: TrackId,
    kind: TrackKind,
    media: Arc<dyn TrackLocal + Send + Sync>,
}

impl LocalTrack {
    pub fn new(kind: TrackKind, media: Arc<dyn TrackLocal + Send + Sync>) -> Self {
        Self {
            id: TrackId(media.id().to_owned()),
            kind,
            media,
        }
    }

    /// Sample-fed track with a fresh id, grouped under `stream_id`.
    pub fn sample(kind: TrackKind, stream_id: &str) -> (Self, Arc<TrackLocalStaticSample>) {
        let id = format!("{}-{}", kind.label(), uuid::Uuid::new_v4());
        let sample = Arc::new(TrackLocalStaticSample::new(
            kind.codec_capability(),
            id,
            stream_id.to_owned(),
        ));
        let track = Self::new(kind, sample.clone());
        (track, sample)
    }

    pub fn id(&self) -> &TrackId {
        &self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn media(&self) -> Arc<dyn TrackLocal + Send + Sync> {
        self.media.clone()
    }
}

impl fmt::Debug for LocalTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A track received from a remote member.
#[derive(Clone)]
pub struct RemoteTrack {
    pub id: TrackId,
    pub kind: TrackKind,
    pub stream_id: String,
    /// Present when the track came from a live transport.
    pub media: Option<Arc<TrackRemote>>,
}

impl RemoteTrack {
    pub fn from_remote(media: Arc<TrackRemote>) -> Option<Self> {
        let id = media.id();
        let kind = TrackKind::classify(media.kind(), &id)?;
        Some(Self {
            id: TrackId(id),
            kind,
            stream_id: media.stream_id(),
            media: Some(media),
        })
    }
}

impl fmt::Debug for RemoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("stream_id", &self.stream_id)
            .finish()
    }
}
