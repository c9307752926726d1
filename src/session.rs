//! Connection/room lifecycle controller for the chat session.
//!
//! Owns at most one transport connection at a time, tracks the joined room,
//! and routes inbound events into an append-only display log. Operations
//! with unmet preconditions log and do nothing; nothing is queued for later.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::protocol::{ClientEvent, ServerEvent};
use crate::transport::{Connector, Transport, TransportEvent};
use crate::types::{ConnectionState, DisplayMessage, MessageOrigin};

pub struct Session {
    connector: Arc<dyn Connector>,
    auto_reconnect: bool,
    state: ConnectionState,
    current_room: Option<String>,
    log: Vec<DisplayMessage>,
    transport: Option<Box<dyn Transport>>,
    events: Option<mpsc::UnboundedReceiver<TransportEvent>>,
}

impl Session {
    pub fn new(connector: Arc<dyn Connector>, auto_reconnect: bool) -> Self {
        Self {
            connector,
            auto_reconnect,
            state: ConnectionState::Disconnected,
            current_room: None,
            log: Vec::new(),
            transport: None,
            events: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn current_room(&self) -> Option<&str> {
        self.current_room.as_deref()
    }

    pub fn messages(&self) -> &[DisplayMessage] {
        &self.log
    }

    /// Open a fresh connection. No-op while one is already up or being
    /// established.
    pub async fn connect(&mut self) {
        if self.state != ConnectionState::Disconnected {
            tracing::info!("Already connected, ignoring connect request");
            return;
        }

        // The events channel must reach the connector before the dial
        // starts, otherwise early events could be dropped
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        match self.connector.open(events_tx).await {
            Ok(transport) => {
                self.transport = Some(transport);
                self.events = Some(events_rx);
                self.state = ConnectionState::Connecting;
                tracing::info!("Connecting");
            }
            Err(e) => {
                tracing::warn!("Failed to start connection: {}", e);
            }
        }
    }

    /// Tear the session down. Idempotent; clears the joined room and the
    /// display log, and stops processing events from the old transport.
    pub fn disconnect(&mut self) {
        self.events = None;
        if let Some(transport) = self.transport.take() {
            transport.close();
            tracing::info!("Disconnected");
        }
        self.state = ConnectionState::Disconnected;
        self.current_room = None;
        self.log.clear();
    }

    /// Join a room, leaving the current one first if a different room is
    /// joined. Membership is recorded optimistically; no ack is awaited.
    pub fn join_room(&mut self, name: &str) {
        let name = name.trim();
        if self.state != ConnectionState::Connected {
            tracing::warn!("Cannot join a room while not connected");
            return;
        }
        if name.is_empty() {
            tracing::warn!("Ignoring join request with empty room name");
            return;
        }
        if self.current_room.as_deref() == Some(name) {
            tracing::debug!("Already in room {}", name);
            return;
        }

        if let Some(old) = self.current_room.take() {
            self.emit(ClientEvent::LeaveRoom { room: old });
        }
        self.emit(ClientEvent::JoinRoom {
            room: name.to_string(),
        });
        self.current_room = Some(name.to_string());
        tracing::info!("Joined room {}", name);
    }

    /// Leave the joined room, if any.
    pub fn leave_room(&mut self) {
        if self.state != ConnectionState::Connected {
            tracing::warn!("Cannot leave a room while not connected");
            return;
        }
        match self.current_room.take() {
            Some(room) => {
                self.emit(ClientEvent::LeaveRoom { room: room.clone() });
                tracing::info!("Left room {}", room);
            }
            None => tracing::warn!("No room to leave"),
        }
    }

    /// Send a chat message: to the joined room if there is one, otherwise as
    /// a broadcast to everyone.
    pub fn send_message(&mut self, text: &str) {
        let text = text.trim();
        if self.state != ConnectionState::Connected {
            tracing::warn!("Cannot send while not connected");
            return;
        }
        if text.is_empty() {
            tracing::warn!("Ignoring empty message");
            return;
        }

        let event = match &self.current_room {
            Some(room) => ClientEvent::RoomMessage {
                room: room.clone(),
                message: text.to_string(),
            },
            None => ClientEvent::SendMessage {
                message: text.to_string(),
            },
        };
        self.emit(event);
    }

    /// Wait for the next transport event. Pends forever while disconnected
    /// so this can sit in a select loop.
    pub async fn next_event(&mut self) -> TransportEvent {
        match &mut self.events {
            Some(events) => match events.recv().await {
                Some(event) => event,
                // Transport task gone without a close frame; same as a drop
                None => TransportEvent::Closed,
            },
            None => std::future::pending::<TransportEvent>().await,
        }
    }

    /// Apply one transport event to the session.
    pub async fn apply(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => {
                self.state = ConnectionState::Connected;
                tracing::info!("Session connected");
            }
            TransportEvent::ConnectError(reason) => {
                tracing::warn!("Connection error: {}", reason);
                self.disconnect();
            }
            TransportEvent::Closed => {
                let was_connected = self.state == ConnectionState::Connected;
                self.disconnect();
                if was_connected && self.auto_reconnect {
                    tracing::info!("Connection dropped, reconnecting");
                    self.connect().await;
                }
            }
            TransportEvent::Server(event) => self.log.push(display(event)),
        }
    }

    fn emit(&mut self, event: ClientEvent) {
        if let Some(transport) = &self.transport {
            if let Err(e) = transport.emit(event) {
                tracing::warn!("Transport rejected event: {}", e);
            }
        }
    }
}

fn display(event: ServerEvent) -> DisplayMessage {
    match event {
        ServerEvent::Message { data } => DisplayMessage {
            text: data,
            origin: MessageOrigin::Broadcast,
        },
        ServerEvent::RoomMessage { data } => DisplayMessage {
            text: data,
            origin: MessageOrigin::Room,
        },
        ServerEvent::RoomNotification { data } => DisplayMessage {
            text: data,
            origin: MessageOrigin::Notification,
        },
    }
}
