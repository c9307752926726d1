use parlor::protocol::{ClientEvent, ServerEvent};
use parlor::session::Session;
use parlor::transport::{Connector, Transport, TransportEvent, TransportResult, WsConnector};
use parlor::types::{ConnectionState, MessageOrigin};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Scripted transport: records outbound events and exposes the event sender
/// so tests can play the server side.
#[derive(Default)]
struct Script {
    sent: Mutex<Vec<ClientEvent>>,
    events: Mutex<Option<mpsc::UnboundedSender<TransportEvent>>>,
}

struct ScriptedTransport {
    script: Arc<Script>,
}

impl Transport for ScriptedTransport {
    fn emit(&self, event: ClientEvent) -> TransportResult<()> {
        self.script.sent.lock().unwrap().push(event);
        Ok(())
    }

    fn close(&self) {}
}

struct ScriptedConnector {
    script: Arc<Script>,
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn open(
        &self,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> TransportResult<Box<dyn Transport>> {
        *self.script.events.lock().unwrap() = Some(events);
        Ok(Box::new(ScriptedTransport {
            script: self.script.clone(),
        }))
    }
}

fn scripted_session() -> (Session, Arc<Script>) {
    let script = Arc::new(Script::default());
    let connector = Arc::new(ScriptedConnector {
        script: script.clone(),
    });
    (Session::new(connector, false), script)
}

fn play(script: &Script, event: TransportEvent) {
    script
        .events
        .lock()
        .unwrap()
        .as_ref()
        .expect("connection was opened")
        .send(event)
        .expect("session is listening");
}

/// End-to-end flow against a scripted transport: connect, join a room,
/// receive a room message.
#[tokio::test]
async fn test_connect_join_and_receive_room_message() {
    let (mut session, script) = scripted_session();

    // 1. Connect; the dial outcome arrives as an event
    session.connect().await;
    assert_eq!(session.state(), ConnectionState::Connecting);

    play(&script, TransportEvent::Opened);
    let event = session.next_event().await;
    session.apply(event).await;
    assert_eq!(session.state(), ConnectionState::Connected);

    // 2. Join a room
    session.join_room("lobby");
    assert_eq!(session.current_room(), Some("lobby"));
    assert_eq!(
        *script.sent.lock().unwrap(),
        vec![ClientEvent::JoinRoom {
            room: "lobby".to_string()
        }]
    );

    // 3. A room message arrives
    play(
        &script,
        TransportEvent::Server(ServerEvent::RoomMessage {
            data: "hi".to_string(),
        }),
    );
    let event = session.next_event().await;
    session.apply(event).await;

    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].text, "hi");
    assert_eq!(session.messages()[0].origin, MessageOrigin::Room);
    assert_eq!(session.current_room(), Some("lobby"));
}

/// A broadcast send leaves the log untouched until the server echo arrives.
#[tokio::test]
async fn test_broadcast_send_logs_only_on_echo() {
    let (mut session, script) = scripted_session();
    session.connect().await;
    play(&script, TransportEvent::Opened);
    let event = session.next_event().await;
    session.apply(event).await;

    session.send_message("hello");

    assert_eq!(
        *script.sent.lock().unwrap(),
        vec![ClientEvent::SendMessage {
            message: "hello".to_string()
        }]
    );
    assert!(session.messages().is_empty());

    play(
        &script,
        TransportEvent::Server(ServerEvent::Message {
            data: "user: hello".to_string(),
        }),
    );
    let event = session.next_event().await;
    session.apply(event).await;

    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].origin, MessageOrigin::Broadcast);
}

/// Mixed broadcast/room/notification arrivals land in the log in arrival
/// order, whatever their channel.
#[tokio::test]
async fn test_log_preserves_arrival_order_across_channels() {
    let (mut session, script) = scripted_session();
    session.connect().await;
    play(&script, TransportEvent::Opened);
    let event = session.next_event().await;
    session.apply(event).await;
    session.join_room("lobby");

    play(
        &script,
        TransportEvent::Server(ServerEvent::RoomNotification {
            data: "user joined lobby".to_string(),
        }),
    );
    play(
        &script,
        TransportEvent::Server(ServerEvent::Message {
            data: "everyone: hi".to_string(),
        }),
    );
    play(
        &script,
        TransportEvent::Server(ServerEvent::RoomMessage {
            data: "lobby: hi".to_string(),
        }),
    );

    for _ in 0..3 {
        let event = session.next_event().await;
        session.apply(event).await;
    }

    let origins: Vec<MessageOrigin> = session.messages().iter().map(|m| m.origin).collect();
    assert_eq!(
        origins,
        vec![
            MessageOrigin::Notification,
            MessageOrigin::Broadcast,
            MessageOrigin::Room,
        ]
    );
}

/// A connect_error while Connecting lands the session back in Disconnected.
#[tokio::test]
async fn test_connect_error_while_connecting() {
    let (mut session, script) = scripted_session();
    session.connect().await;
    assert_eq!(session.state(), ConnectionState::Connecting);

    play(
        &script,
        TransportEvent::ConnectError("connection refused".to_string()),
    );
    let event = session.next_event().await;
    session.apply(event).await;

    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert_eq!(session.current_room(), None);
}

/// Minimal stand-in for the chat backend: accepts one WebSocket connection
/// and echoes events back the way the real server does.
async fn spawn_chat_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();

        while let Some(Ok(frame)) = socket.next().await {
            let text = match frame {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };
            let event: ClientEvent = serde_json::from_str(&text).unwrap();
            let reply = match event {
                ClientEvent::SendMessage { message } => ServerEvent::Message {
                    data: format!("user: {}", message),
                },
                ClientEvent::JoinRoom { room } => ServerEvent::RoomNotification {
                    data: format!("user joined {}", room),
                },
                ClientEvent::LeaveRoom { room } => ServerEvent::RoomNotification {
                    data: format!("user left {}", room),
                },
                ClientEvent::RoomMessage { message, .. } => ServerEvent::RoomMessage {
                    data: format!("user: {}", message),
                },
            };
            let json = serde_json::to_string(&reply).unwrap();
            if socket.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    addr
}

/// Full round trip over a real WebSocket connection.
#[tokio::test]
async fn test_websocket_round_trip() {
    let addr = spawn_chat_server().await;

    let connector = Arc::new(WsConnector::new(
        format!("ws://{}", addr),
        Duration::from_secs(5),
    ));
    let mut session = Session::new(connector, false);

    session.connect().await;
    let event = session.next_event().await;
    assert_eq!(event, TransportEvent::Opened);
    session.apply(event).await;
    assert_eq!(session.state(), ConnectionState::Connected);

    session.join_room("lobby");
    let event = session.next_event().await;
    assert_eq!(
        event,
        TransportEvent::Server(ServerEvent::RoomNotification {
            data: "user joined lobby".to_string()
        })
    );
    session.apply(event).await;

    session.send_message("hello");
    let event = session.next_event().await;
    assert_eq!(
        event,
        TransportEvent::Server(ServerEvent::RoomMessage {
            data: "user: hello".to_string()
        })
    );
    session.apply(event).await;

    assert_eq!(session.messages().len(), 2);
    assert_eq!(session.current_room(), Some("lobby"));

    session.disconnect();
    assert_eq!(session.state(), ConnectionState::Disconnected);
    assert!(session.messages().is_empty());
}

/// Dialing a dead port surfaces as a connect_error event, not a hang.
#[tokio::test]
async fn test_dial_failure_surfaces_as_connect_error() {
    // Bind then drop to get a port with nothing listening on it
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let connector = Arc::new(WsConnector::new(
        format!("ws://{}", addr),
        Duration::from_secs(5),
    ));
    let mut session = Session::new(connector, false);

    session.connect().await;
    let event = session.next_event().await;
    assert!(matches!(event, TransportEvent::ConnectError(_)));
    session.apply(event).await;

    assert_eq!(session.state(), ConnectionState::Disconnected);
}
