use serde::{Deserialize, Serialize};

/// Lifecycle of the realtime session's one connection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Which channel a logged chat line arrived on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageOrigin {
    /// Delivered to every connected client
    Broadcast,
    /// Delivered to members of the joined room
    Room,
    /// Room lifecycle notice (someone joined or left)
    Notification,
}

/// One entry in the chat display log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayMessage {
    pub text: String,
    pub origin: MessageOrigin,
}

/// An item as stored by the REST backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// ISO8601 timestamp assigned by the backend on creation
    pub created_at: Option<String>,
}

/// Payload for creating or updating an item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

/// Aggregate statistics over all items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub total_items: u64,
    pub total_value: f64,
    pub average_price: f64,
}

/// Health check response from the REST backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}
