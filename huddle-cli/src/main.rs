mod join;
mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use huddle::utils::DEFAULT_WS_PATH;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle", version)]
#[command(about = "Mesh video rooms: signaling relay and headless client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve {
        #[arg(long, env = "HUDDLE_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,

        #[arg(long, env = "HUDDLE_WS_PATH", default_value = DEFAULT_WS_PATH)]
        ws_path: String,

        /// STUN/TURN urls advertised to clients, comma separated.
        #[arg(long, env = "HUDDLE_ICE_SERVERS", value_delimiter = ',')]
        ice_servers: Vec<String>,
    },

    /// Join a room as a headless participant.
    Join {
        /// Room id, or a page URL whose last path segment names the room.
        room: String,

        #[arg(long, env = "HUDDLE_URL", default_value = "ws://127.0.0.1:3000/api/socket")]
        url: String,

        /// Member id to use instead of a generated one.
        #[arg(long)]
        member: Option<String>,

        /// Publish an (empty) audio track.
        #[arg(long)]
        audio: bool,

        /// Publish an (empty) video track.
        #[arg(long)]
        video: bool,

        /// Chat message to send once joined.
        #[arg(long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Commands::Serve {
            bind,
            ws_path,
            ice_servers,
        } => serve::run(bind, ws_path, ice_servers).await,

        Commands::Join {
            room,
            url,
            member,
            audio,
            video,
            message,
        } => {
            join::run(join::JoinArgs {
                room,
                url,
                member,
                audio,
                video,
                message,
            })
            .await
        }
    }
}
