use crate::media::{LocalTrack, RemoteTrack, TrackId};
use crate::peer::link_event::LinkEvent;
use crate::peer::negotiation::{LinkKey, TransportState};
use crate::peer::peer_transport::{PeerTransport, TransportFactory};
use anyhow::{Context, Result};
use async_trait::async_trait;
use huddle_core::{IceCandidate, IceServerConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_remote::TrackRemote;

/// [`PeerTransport`] over a webrtc-rs peer connection.
pub struct RtcTransport {
    key: LinkKey,
    peer_connection: Arc<RTCPeerConnection>,
    /// Keeps an `m=application` section in every offer.
    chat: Arc<RTCDataChannel>,
    senders: Mutex<HashMap<TrackId, Arc<RTCRtpSender>>>,
}

impl RtcTransport {
    /// Builds the peer connection and wires its callbacks into `events`.
    pub async fn new(
        key: LinkKey,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = events.clone();
        let state_key = key.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let key = state_key.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {:?}", key, s);
                    let _ = tx.send(LinkEvent::TransportState(key, transport_state(s)));
                })
            },
        ));

        let ice_tx = events.clone();
        let ice_key = key.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let key = ice_key.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                };
                let _ = tx.send(LinkEvent::CandidateGenerated(key, candidate));
            })
        }));

        let track_tx = events;
        let track_key = key.clone();
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _, _| {
            let tx = track_tx.clone();
            let key = track_key.clone();

            Box::pin(async move {
                let Some(remote) = RemoteTrack::from_remote(track) else {
                    return;
                };
                debug!("Remote {} track {} from {}", remote.kind, remote.id, key);
                let _ = tx.send(LinkEvent::RemoteTrack(key, remote));
            })
        }));

        let chat = peer_connection
            .create_data_channel("chat", None)
            .await
            .context("Failed to create data channel")?;
        let open_key = key.clone();
        chat.on_open(Box::new(move || {
            let key = open_key.clone();
            Box::pin(async move {
                debug!("Data channel to {} open", key);
            })
        }));

        Ok(Self {
            key,
            peer_connection,
            chat,
            senders: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_offer(&self) -> Result<String> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn set_remote_offer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::offer(sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn set_remote_answer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::answer(sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        let mut desc = self
            .peer_connection
            .pending_local_description()
            .await
            .context("no local offer to roll back")?;
        desc.sdp_type = RTCSdpType::Rollback;
        self.peer_connection.set_local_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn attach_track(&self, track: &LocalTrack) -> Result<bool> {
        let mut senders = self.senders.lock().await;
        if senders.contains_key(track.id()) {
            return Ok(false);
        }

        let sender = self.peer_connection.add_track(track.media()).await?;

        // RTCP has to be drained for the interceptors to keep working.
        let rtcp = sender.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 1500];
            while rtcp.read(&mut buf).await.is_ok() {}
        });

        debug!("Attached {} to {}", track.id(), self.key);
        senders.insert(track.id().clone(), sender);
        Ok(true)
    }

    async fn detach_track(&self, track_id: &TrackId) -> Result<bool> {
        let Some(sender) = self.senders.lock().await.remove(track_id) else {
            return Ok(false);
        };
        self.peer_connection.remove_track(&sender).await?;
        debug!("Detached {} from {}", track_id, self.key);
        Ok(true)
    }

    async fn close(&self) -> Result<()> {
        self.senders.lock().await.clear();
        if let Err(e) = self.chat.close().await {
            debug!("Closing data channel to {}: {}", self.key, e);
        }
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn transport_state(state: RTCPeerConnectionState) -> TransportState {
    match state {
        RTCPeerConnectionState::Connecting => TransportState::Connecting,
        RTCPeerConnectionState::Connected => TransportState::Connected,
        RTCPeerConnectionState::Disconnected => TransportState::Disconnected,
        RTCPeerConnectionState::Failed => TransportState::Failed,
        RTCPeerConnectionState::Closed => TransportState::Closed,
        _ => TransportState::New,
    }
}

/// Makes one [`RtcTransport`] per link.
#[derive(Debug, Default, Clone, Copy)]
pub struct RtcTransportFactory;

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        key: &LinkKey,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let transport = RtcTransport::new(key.clone(), ice_servers, events).await?;
        Ok(Arc::new(transport))
    }
}
