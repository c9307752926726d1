use super::*;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::protocol::{ClientEvent, ServerEvent};

/// WebSocket transport over tokio-tungstenite
pub struct WsConnector {
    url: String,
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(url: String, connect_timeout: Duration) -> Self {
        Self {
            url,
            connect_timeout,
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn open(
        &self,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> TransportResult<Box<dyn Transport>> {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_socket(
            self.url.clone(),
            self.connect_timeout,
            events,
            commands_rx,
        ));

        Ok(Box::new(WsTransport {
            commands: commands_tx,
        }))
    }
}

enum Command {
    Emit(ClientEvent),
    Close,
}

struct WsTransport {
    commands: mpsc::UnboundedSender<Command>,
}

impl Transport for WsTransport {
    fn emit(&self, event: ClientEvent) -> TransportResult<()> {
        self.commands
            .send(Command::Emit(event))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&self) {
        let _ = self.commands.send(Command::Close);
    }
}

/// Owns the socket for the lifetime of one connection: dials, then pumps
/// outbound commands and inbound frames until either side goes away.
async fn run_socket(
    url: String,
    connect_timeout: Duration,
    events: mpsc::UnboundedSender<TransportEvent>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let socket = match tokio::time::timeout(connect_timeout, connect_async(url.as_str())).await {
        Ok(Ok((socket, _response))) => socket,
        Ok(Err(e)) => {
            tracing::warn!("Connection to {} failed: {}", url, e);
            let _ = events.send(TransportEvent::ConnectError(e.to_string()));
            return;
        }
        Err(_) => {
            tracing::warn!(
                "Connection to {} timed out after {:?}",
                url,
                connect_timeout
            );
            let _ = events.send(TransportEvent::ConnectError(
                TransportError::Timeout(connect_timeout).to_string(),
            ));
            return;
        }
    };

    tracing::info!("Connected to {}", url);
    if events.send(TransportEvent::Opened).is_err() {
        // Receiver already gone, nobody cares about this connection
        return;
    }

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(Command::Emit(event)) => {
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if sender.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::error!("Failed to encode client event: {}", e),
                        }
                    }
                    Some(Command::Close) | None => {
                        let _ = sender.send(Message::Close(None)).await;
                        tracing::info!("Connection to {} closed", url);
                        break;
                    }
                }
            }

            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ServerEvent>(&text) {
                            Ok(event) => {
                                if events.send(TransportEvent::Server(event)).is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::debug!("Ignoring unrecognized server event: {} ({})", text, e);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("Server closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    let _ = events.send(TransportEvent::Closed);
}
