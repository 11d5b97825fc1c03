use serde::{Deserialize, Serialize};

/// One stored notification as returned by the batch pull endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Notification {
    pub message: String,
    pub time: String,
}

/// Response body of the batch pull: the full current list, newest first.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotificationBatch {
    pub notifications: Vec<Notification>,
}

/// One frame off the push socket. The server includes no display time,
/// so `time` is almost always absent and the panel renders a relative
/// label in its place.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PushFrame {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}
