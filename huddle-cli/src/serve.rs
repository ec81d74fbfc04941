use anyhow::{Context, Result};
use colored::*;
use huddle::model::IceServerConfig;
use huddle::server::{RelayConfig, RelayServer};
use std::net::SocketAddr;

pub async fn run(bind: SocketAddr, ws_path: String, ice_servers: Vec<String>) -> Result<()> {
    let mut config = RelayConfig {
        bind,
        ws_path,
        ..Default::default()
    };
    if !ice_servers.is_empty() {
        config.ice_servers = vec![IceServerConfig::stun(ice_servers)];
    }
    let ws_path = config.ws_path.clone();

    let server = RelayServer::start(config)
        .await
        .context("Failed to start relay")?;

    println!(
        "{} ws://{}{}",
        "Relay listening on".green().bold(),
        server.local_addr(),
        ws_path
    );

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    println!("{}", "Relay stopped".yellow());
    Ok(())
}
