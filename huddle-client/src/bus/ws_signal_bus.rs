use crate::bus::signal_bus::SignalBus;
use crate::error::BusError;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientEvent, RelayEvent};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Signaling over a websocket to a relay.
#[derive(Clone)]
pub struct WsSignalBus {
    tx: mpsc::UnboundedSender<ClientEvent>,
}

impl WsSignalBus {
    /// Connects to `url` and returns the bus with its inbound event stream.
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RelayEvent>), BusError> {
        let (ws, _) = connect_async(url).await.map_err(|e| BusError::Connect {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        info!("Connected to relay at {}", url);

        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientEvent>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<RelayEvent>();

        tokio::spawn(async move {
            while let Some(event) = out_rx.recv().await {
                let json = match event.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        warn!("Dropping unencodable event: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(Ok(msg)) = stream.next().await {
                match msg {
                    Message::Text(text) => match RelayEvent::from_json(&text) {
                        Ok(event) => {
                            if in_tx.send(event).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Ignoring malformed relay event: {}", e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            debug!("Relay stream ended");
        });

        Ok((Self { tx: out_tx }, in_rx))
    }
}

impl SignalBus for WsSignalBus {
    fn send(&self, event: ClientEvent) -> Result<(), BusError> {
        self.tx.send(event).map_err(|_| BusError::Closed)
    }
}
