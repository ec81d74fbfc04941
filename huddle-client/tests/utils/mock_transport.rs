use async_trait::async_trait;
use huddle_client::{
    LinkEvent, LinkKey, LocalTrack, PeerTransport, RemoteTrack, TrackId, TrackKind,
    TransportFactory, TransportState,
};
use huddle_core::{IceCandidate, IceServerConfig, MemberId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, Notify, mpsc};

/// Every call a link made on its transport, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    CreateOffer,
    CreateAnswer,
    RemoteOffer(String),
    RemoteAnswer(String),
    Rollback,
    Candidate(String),
    Attach(TrackId),
    Detach(TrackId),
    Close,
}

/// Transport that records calls and produces readable fake descriptions.
pub struct MockTransport {
    pub key: LinkKey,
    local: MemberId,
    calls: Mutex<Vec<TransportCall>>,
    events: mpsc::UnboundedSender<LinkEvent>,
    descriptions: AtomicUsize,
    /// When set, `create_offer` waits for `release` before returning.
    stall_offers: bool,
    release: Arc<Notify>,
}

impl MockTransport {
    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.calls.lock().await.contains(&TransportCall::Close)
    }

    /// Tracks currently attached, oldest first.
    pub async fn attached(&self) -> Vec<TrackId> {
        attached(&self.calls.lock().await)
    }

    pub async fn count(&self, call: &TransportCall) -> usize {
        self.calls.lock().await.iter().filter(|c| *c == call).count()
    }

    pub async fn offers(&self) -> usize {
        self.count(&TransportCall::CreateOffer).await
    }

    pub async fn count_remote_offers(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| matches!(c, TransportCall::RemoteOffer(_)))
            .count()
    }

    /// Pretends ICE gathering produced a candidate.
    pub fn emit_candidate(&self, candidate: &str) {
        let _ = self.events.send(LinkEvent::CandidateGenerated(
            self.key.clone(),
            IceCandidate {
                candidate: candidate.to_owned(),
                sdp_mid: Some("0".into()),
                sdp_m_line_index: Some(0),
            },
        ));
    }

    pub fn emit_remote_track(&self, kind: TrackKind) {
        let _ = self.events.send(LinkEvent::RemoteTrack(
            self.key.clone(),
            RemoteTrack {
                id: TrackId(format!("{}-from-{}", kind, self.key.member)),
                kind,
                stream_id: self.key.member.to_string(),
                media: None,
            },
        ));
    }

    pub fn emit_state(&self, state: TransportState) {
        let _ = self
            .events
            .send(LinkEvent::TransportState(self.key.clone(), state));
    }

    async fn record(&self, call: TransportCall) {
        self.calls.lock().await.push(call);
    }

    fn description(&self, kind: &str) -> String {
        let n = self.descriptions.fetch_add(1, Ordering::SeqCst);
        format!("{} {}->{} #{}", kind, self.local, self.key.member, n)
    }
}

fn attached(calls: &[TransportCall]) -> Vec<TrackId> {
    let mut attached = Vec::new();
    for call in calls {
        match call {
            TransportCall::Attach(id) => attached.push(id.clone()),
            TransportCall::Detach(id) => attached.retain(|a| a != id),
            _ => {}
        }
    }
    attached
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self) -> anyhow::Result<String> {
        self.record(TransportCall::CreateOffer).await;
        if self.stall_offers {
            self.release.notified().await;
        }
        Ok(self.description("offer"))
    }

    async fn create_answer(&self) -> anyhow::Result<String> {
        self.record(TransportCall::CreateAnswer).await;
        Ok(self.description("answer"))
    }

    async fn set_remote_offer(&self, sdp: String) -> anyhow::Result<()> {
        if !sdp.starts_with("offer ") {
            anyhow::bail!("not an offer: {sdp}");
        }
        self.record(TransportCall::RemoteOffer(sdp)).await;
        Ok(())
    }

    async fn set_remote_answer(&self, sdp: String) -> anyhow::Result<()> {
        if !sdp.starts_with("answer ") {
            anyhow::bail!("not an answer: {sdp}");
        }
        self.record(TransportCall::RemoteAnswer(sdp)).await;
        Ok(())
    }

    async fn rollback(&self) -> anyhow::Result<()> {
        self.record(TransportCall::Rollback).await;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> anyhow::Result<()> {
        self.record(TransportCall::Candidate(candidate.candidate))
            .await;
        Ok(())
    }

    async fn attach_track(&self, track: &LocalTrack) -> anyhow::Result<bool> {
        let mut calls = self.calls.lock().await;
        if attached(&calls).contains(track.id()) {
            return Ok(false);
        }
        calls.push(TransportCall::Attach(track.id().clone()));
        Ok(true)
    }

    async fn detach_track(&self, track_id: &TrackId) -> anyhow::Result<bool> {
        let mut calls = self.calls.lock().await;
        if !attached(&calls).contains(track_id) {
            return Ok(false);
        }
        calls.push(TransportCall::Detach(track_id.clone()));
        Ok(true)
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.record(TransportCall::Close).await;
        Ok(())
    }
}

/// Hands out [`MockTransport`]s and keeps every one it made.
pub struct MockTransportFactory {
    local: MemberId,
    created: Mutex<Vec<Arc<MockTransport>>>,
    stall_offers: AtomicBool,
    release: Arc<Notify>,
}

impl MockTransportFactory {
    pub fn new(local: &MemberId) -> Arc<Self> {
        Arc::new(Self {
            local: local.clone(),
            created: Mutex::new(Vec::new()),
            stall_offers: AtomicBool::new(false),
            release: Arc::new(Notify::new()),
        })
    }

    /// Transports created from now on hold every offer until [`Self::release_offers`].
    pub fn stall_offers(&self) {
        self.stall_offers.store(true, Ordering::SeqCst);
    }

    pub fn release_offers(&self) {
        self.release.notify_waiters();
    }

    pub async fn all(&self) -> Vec<Arc<MockTransport>> {
        self.created.lock().await.clone()
    }

    /// Most recent transport towards `member`.
    pub async fn to(&self, member: &MemberId) -> Option<Arc<MockTransport>> {
        self.created
            .lock()
            .await
            .iter()
            .rev()
            .find(|t| &t.key.member == member)
            .cloned()
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(
        &self,
        key: &LinkKey,
        _ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> anyhow::Result<Arc<dyn PeerTransport>> {
        let transport = Arc::new(MockTransport {
            key: key.clone(),
            local: self.local.clone(),
            calls: Mutex::new(Vec::new()),
            events,
            descriptions: AtomicUsize::new(0),
            stall_offers: self.stall_offers.load(Ordering::SeqCst),
            release: self.release.clone(),
        });
        self.created.lock().await.push(transport.clone());
        Ok(transport)
    }
}
