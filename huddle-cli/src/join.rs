use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::*;
use huddle::MemberId;
use huddle::client::{
    ClientConfig, LinkError, MEMBER_ID_KEY, MediaError, MemorySessionStore, PeerObserver,
    PeerSet, RemoteTrack, Role, RtcTransportFactory, SessionStore, TrackKind, WsSignalBus,
};
use std::sync::Arc;

pub struct JoinArgs {
    pub room: String,
    pub url: String,
    pub member: Option<String>,
    pub audio: bool,
    pub video: bool,
    pub message: Option<String>,
}

/// Prints room activity to the terminal.
struct ConsoleObserver;

#[async_trait]
impl PeerObserver for ConsoleObserver {
    async fn on_peer_joined(&self, member: &MemberId, role: Role) {
        let role = match role {
            Role::Initiator => "we offer",
            Role::Responder => "they offer",
        };
        println!("{} {} ({})", "+".green().bold(), member, role);
    }

    async fn on_track(&self, member: &MemberId, track: RemoteTrack) {
        println!("{} {} track from {}", "~".cyan(), track.kind, member);
    }

    async fn on_peer_left(&self, member: &MemberId) {
        println!("{} {}", "-".yellow().bold(), member);
    }

    async fn on_link_failed(&self, error: &LinkError) {
        println!("{} {}", "!".red().bold(), error);
    }

    async fn on_message(&self, member: &MemberId, message: &str) {
        println!("{} {}", format!("[{member}]").blue(), message);
    }

    async fn on_media_error(&self, error: &MediaError) {
        println!("{} {}", "!".red().bold(), error);
    }

    async fn on_disconnected(&self) {
        println!("{}", "Relay connection lost".red());
    }
}

pub async fn run(args: JoinArgs) -> Result<()> {
    let store = MemorySessionStore::new();
    if let Some(member) = args.member {
        store.set(MEMBER_ID_KEY, member);
    }
    let config = ClientConfig::from_page_url(args.url, &args.room, &store)?;

    let (bus, inbound) = WsSignalBus::connect(&config.url)
        .await
        .context("Failed to reach relay")?;

    let set = PeerSet::builder(
        config.member.clone(),
        config.room.clone(),
        Arc::new(RtcTransportFactory),
    )
    .observer(Arc::new(ConsoleObserver))
    .spawn(Arc::new(bus), inbound);

    println!(
        "{} room {} as {}",
        "Joined".green().bold(),
        config.room.as_str().bold(),
        config.member
    );

    if args.audio {
        set.enable(TrackKind::Audio).await?;
    }
    if args.video {
        set.enable(TrackKind::Video).await?;
    }
    if let Some(message) = args.message {
        set.send_message(message).await?;
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            let released = set.leave().await?;
            println!("{} ({} links released)", "Left".yellow(), released);
        }
        _ = set.stopped() => {}
    }

    Ok(())
}
