use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{RelayError, RelayResult},
    rooms::{Message, Reactions},
};

/// Wire format, one JSON object per websocket text frame:
///
///   {"event": "join_room", "data": {"username": "alice", "room": "General"}}
///
/// Inbound events are a closed set; anything that doesn't match one of the
/// variants below (unknown name, missing field, wrong type) is rejected
/// before it reaches the relay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom {
        username: String,
        room: String,
    },
    LeaveRoom {
        username: String,
        room: String,
    },
    SendMessage {
        room: String,
        username: String,
        text: String,
    },
    AddReaction {
        #[serde(rename = "messageId")]
        message_id: String,
        emoji: String,
        room: String,
    },
}

impl ClientEvent {
    pub fn parse(frame: &str) -> RelayResult<Self> {
        serde_json::from_str(frame).map_err(|e| RelayError::Malformed(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        use ClientEvent::*;
        match self {
            JoinRoom { .. } => "join_room",
            LeaveRoom { .. } => "leave_room",
            SendMessage { .. } => "send_message",
            AddReaction { .. } => "add_reaction",
        }
    }
}

/// Everything the relay can push to a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    RoomHistory {
        messages: Vec<Message>,
    },
    UserListUpdate {
        users: Vec<String>,
    },
    UserJoined {
        user: String,
    },
    UserLeft {
        user: String,
    },
    NewMessage {
        message: Message,
    },
    UpdateReactions {
        #[serde(rename = "messageId")]
        message_id: Uuid,
        reactions: Reactions,
    },
    /// Sent only to the connection whose event was rejected.
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        use ServerEvent::*;
        match self {
            RoomHistory { .. } => "room_history",
            UserListUpdate { .. } => "user_list_update",
            UserJoined { .. } => "user_joined",
            UserLeft { .. } => "user_left",
            NewMessage { .. } => "new_message",
            UpdateReactions { .. } => "update_reactions",
            Error { .. } => "error",
        }
    }

    pub fn to_json(&self) -> RelayResult<String> {
        serde_json::to_string(self).map_err(|e| RelayError::Malformed(e.to_string()))
    }
}
