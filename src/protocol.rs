//! Wire events exchanged with the chat backend.
//!
//! Event names match what the server dispatches on; payload shapes are owned
//! by the server and treated as opaque text on this side.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Broadcast a message to every connected client
    SendMessage {
        message: String,
    },
    JoinRoom {
        room: String,
    },
    LeaveRoom {
        room: String,
    },
    /// Message to the members of one room
    RoomMessage {
        room: String,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Broadcast message
    Message { data: String },
    /// Message within the joined room
    RoomMessage { data: String },
    /// Room lifecycle notice (member joined or left)
    RoomNotification { data: String },
}
