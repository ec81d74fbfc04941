use crate::bus::SignalBus;
use crate::error::LinkError;
use crate::media::{LocalTrack, TrackId};
use crate::peer::link_event::LinkEvent;
use crate::peer::negotiation::{LinkKey, NegotiationState, Role};
use crate::peer::peer_transport::PeerTransport;
use huddle_core::{IceCandidate, MemberId, SignalData, SignalEnvelope};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Work queued for a link. Processed strictly in arrival order.
#[derive(Debug)]
pub(crate) enum LinkInput {
    /// Send the first offer. Only meaningful for the initiator.
    Start,
    Signal(SignalData),
    /// Gathered by our transport; goes out behind any description already sent.
    LocalCandidate(IceCandidate),
    AttachTrack(LocalTrack),
    DetachTrack(TrackId),
}

/// Negotiation state machine for one remote member.
pub(crate) struct PeerLink {
    key: LinkKey,
    local: MemberId,
    role: Role,
    state: NegotiationState,
    transport: Arc<dyn PeerTransport>,
    bus: Arc<dyn SignalBus>,
    events: mpsc::UnboundedSender<LinkEvent>,
    remote_applied: bool,
    pending_candidates: Vec<IceCandidate>,
    renegotiate: bool,
}

impl PeerLink {
    pub(crate) fn new(
        key: LinkKey,
        local: MemberId,
        role: Role,
        transport: Arc<dyn PeerTransport>,
        bus: Arc<dyn SignalBus>,
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Self {
        Self {
            key,
            local,
            role,
            state: NegotiationState::New,
            transport,
            bus,
            events,
            remote_applied: false,
            pending_candidates: Vec::new(),
            renegotiate: false,
        }
    }

    /// Attaches `tracks` ahead of the first exchange, then drains `inbox` until it closes.
    pub(crate) async fn run(
        mut self,
        tracks: Vec<LocalTrack>,
        mut inbox: mpsc::UnboundedReceiver<LinkInput>,
    ) {
        debug!("Link {} started as {:?}", self.key, self.role);

        for track in tracks {
            self.handle(LinkInput::AttachTrack(track)).await;
        }

        while let Some(input) = inbox.recv().await {
            self.handle(input).await;
        }

        debug!("Link {} stopped", self.key);
    }

    pub(crate) async fn handle(&mut self, input: LinkInput) {
        if self.state == NegotiationState::Closed {
            debug!("Link {} is closed, ignoring {:?}", self.key, input);
            return;
        }

        let result = match input {
            LinkInput::Start => self.on_start().await,
            LinkInput::Signal(SignalData::Offer { sdp }) => self.on_remote_offer(sdp).await,
            LinkInput::Signal(SignalData::Answer { sdp }) => self.on_remote_answer(sdp).await,
            LinkInput::Signal(SignalData::Candidate { candidate }) => {
                self.on_remote_candidate(candidate).await;
                Ok(())
            }
            LinkInput::LocalCandidate(candidate) => {
                if let Err(e) = self.send(SignalData::Candidate { candidate }) {
                    debug!("Link {}: candidate not sent: {}", self.key, e);
                }
                Ok(())
            }
            LinkInput::AttachTrack(track) => self.on_attach(track).await,
            LinkInput::DetachTrack(track_id) => self.on_detach(track_id).await,
        };

        if let Err(error) = result {
            self.fail(error).await;
        }
    }

    pub(crate) fn state(&self) -> NegotiationState {
        self.state
    }

    async fn on_start(&mut self) -> Result<(), LinkError> {
        if self.role != Role::Initiator || self.state != NegotiationState::New {
            debug!("Link {}: nothing to start in {:?}", self.key, self.state);
            return Ok(());
        }
        self.send_offer().await
    }

    async fn on_remote_offer(&mut self, sdp: String) -> Result<(), LinkError> {
        if self.state == NegotiationState::HaveLocalOffer {
            match self.role {
                Role::Initiator => {
                    debug!("Link {}: offer collision, keeping ours", self.key);
                    return Ok(());
                }
                Role::Responder => {
                    debug!("Link {}: offer collision, rolling back", self.key);
                    self.transport
                        .rollback()
                        .await
                        .map_err(self.step_failed("rollback"))?;
                    self.renegotiate = true;
                }
            }
        }

        self.transport
            .set_remote_offer(sdp)
            .await
            .map_err(self.step_failed("apply offer"))?;
        self.set_state(NegotiationState::HaveRemoteOffer);
        self.flush_candidates().await;

        let answer = self
            .transport
            .create_answer()
            .await
            .map_err(self.step_failed("create answer"))?;
        self.send(SignalData::Answer { sdp: answer })?;

        self.on_negotiated().await
    }

    async fn on_remote_answer(&mut self, sdp: String) -> Result<(), LinkError> {
        if self.state != NegotiationState::HaveLocalOffer {
            debug!(
                "Link {}: discarding answer, no offer outstanding ({:?})",
                self.key, self.state
            );
            return Ok(());
        }

        self.transport
            .set_remote_answer(sdp)
            .await
            .map_err(self.step_failed("apply answer"))?;
        self.flush_candidates().await;

        self.on_negotiated().await
    }

    async fn on_remote_candidate(&mut self, candidate: IceCandidate) {
        if !self.remote_applied {
            debug!("Link {}: buffering early ICE candidate", self.key);
            self.pending_candidates.push(candidate);
            return;
        }
        self.apply_candidate(candidate).await;
    }

    async fn on_attach(&mut self, track: LocalTrack) -> Result<(), LinkError> {
        match self.transport.attach_track(&track).await {
            Ok(true) => self.request_renegotiation().await,
            Ok(false) => Ok(()),
            Err(e) => {
                warn!("Link {}: could not attach {}: {:#}", self.key, track.id(), e);
                Ok(())
            }
        }
    }

    async fn on_detach(&mut self, track_id: TrackId) -> Result<(), LinkError> {
        match self.transport.detach_track(&track_id).await {
            Ok(true) => self.request_renegotiation().await,
            Ok(false) => Ok(()),
            Err(e) => {
                warn!("Link {}: could not detach {}: {:#}", self.key, track_id, e);
                Ok(())
            }
        }
    }

    async fn request_renegotiation(&mut self) -> Result<(), LinkError> {
        match self.state {
            // The initiator's first offer carries the change. A responder can only
            // answer what it is offered, so it follows its answer with an offer.
            NegotiationState::New => {
                if self.role == Role::Responder {
                    self.renegotiate = true;
                }
                Ok(())
            }
            NegotiationState::Connected => self.send_offer().await,
            _ => {
                self.renegotiate = true;
                Ok(())
            }
        }
    }

    async fn send_offer(&mut self) -> Result<(), LinkError> {
        self.renegotiate = false;
        let sdp = self
            .transport
            .create_offer()
            .await
            .map_err(self.step_failed("create offer"))?;
        self.set_state(NegotiationState::HaveLocalOffer);
        self.send(SignalData::Offer { sdp })
    }

    async fn on_negotiated(&mut self) -> Result<(), LinkError> {
        self.set_state(NegotiationState::Connected);
        if self.renegotiate {
            self.send_offer().await?;
        }
        Ok(())
    }

    async fn flush_candidates(&mut self) {
        self.remote_applied = true;
        for candidate in std::mem::take(&mut self.pending_candidates) {
            self.apply_candidate(candidate).await;
        }
    }

    async fn apply_candidate(&self, candidate: IceCandidate) {
        if let Err(e) = self.transport.add_ice_candidate(candidate).await {
            warn!("Link {}: rejected ICE candidate: {:#}", self.key, e);
        }
    }

    fn send(&self, payload: SignalData) -> Result<(), LinkError> {
        let envelope = SignalEnvelope {
            from: self.local.clone(),
            to: self.key.member.clone(),
            payload,
        };
        debug!(
            "{} -> {}: {}",
            envelope.from,
            envelope.to,
            envelope.payload.kind()
        );

        self.bus
            .send(envelope.into())
            .map_err(|e| LinkError::Negotiation {
                member: self.key.member.clone(),
                step: "send signal",
                reason: e.to_string(),
            })
    }

    async fn fail(&mut self, error: LinkError) {
        warn!("Link {} failed: {}", self.key, error);
        if let Err(e) = self.transport.close().await {
            debug!("Link {}: close after failure: {:#}", self.key, e);
        }
        self.set_state(NegotiationState::Closed);
        let _ = self.events.send(LinkEvent::Failed(self.key.clone(), error));
    }

    fn set_state(&mut self, state: NegotiationState) {
        if self.state == state {
            return;
        }
        debug!("Link {}: {:?} -> {:?}", self.key, self.state, state);
        self.state = state;
        let _ = self
            .events
            .send(LinkEvent::Negotiation(self.key.clone(), state));
    }

    fn step_failed(&self, step: &'static str) -> impl FnOnce(anyhow::Error) -> LinkError + use<> {
        let member = self.key.member.clone();
        move |e| LinkError::Negotiation {
            member,
            step,
            reason: format!("{e:#}"),
        }
    }
}
