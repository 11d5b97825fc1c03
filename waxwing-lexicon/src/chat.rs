use serde::{Deserialize, Serialize};

/// Client-to-server frame on the room socket. The server ignores frames
/// that carry neither text nor an attachment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatSend {
    pub message: String,
    pub receiver_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// Server-to-client frame: the stored message echoed to every room
/// member, the sender included. `file_data` and `file_type` come back as
/// explicit nulls when the message has no attachment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatEvent {
    pub id: i64,
    pub message: String,
    #[serde(default)]
    pub file_data: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub timestamp: String,
}

/// One element of the history pull. The endpoint returns a bare JSON
/// array of these, oldest first.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatHistoryMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
    pub timestamp: String,
}
