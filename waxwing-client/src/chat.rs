use crate::error::ClientError;
use crate::session::Session;
use crate::view::{ChannelState, ChatLine, ChatThread, UiEvent};
use chrono::{DateTime, NaiveDateTime};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info, warn};
use waxwing_lexicon::chat::{ChatEvent, ChatHistoryMessage, ChatSend};

/// Normalized room name shared by both participants regardless of who
/// opened the thread.
pub fn room_name(a: i64, b: i64) -> String {
    format!("chat_{}_{}", a.min(b), a.max(b))
}

/// Decodes one text frame off the room socket.
pub fn read_event(data: &str) -> Result<ChatEvent, ClientError> {
    serde_json::from_str::<ChatEvent>(data)
        .map_err(|e| ClientError::Serialization(format!("Chat frame {:?}: {}", data, e)))
}

/// `HH:MM` rendering of a server timestamp, `just now` when it fails to
/// parse. The server emits naive isoformat; offset-bearing timestamps
/// appear once timezone support is switched on, so both are handled.
fn time_label(timestamp: &str) -> String {
    if let Ok(t) = DateTime::parse_from_rfc3339(timestamp) {
        return t.format("%H:%M").to_string();
    }
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| "just now".to_string())
}

/// One direct-message thread between the current user and a peer. Sends
/// go through an outbound queue drained by the session task; the thread
/// view only ever grows from server frames, so the sender sees their own
/// message when the room echo comes back, not before.
pub struct ChatRoom {
    session: Session,
    room: String,
    me: i64,
    peer: i64,
    thread: Arc<Mutex<ChatThread>>,
    updates: broadcast::Sender<UiEvent>,
    out_tx: mpsc::UnboundedSender<ChatSend>,
    out_rx: Mutex<Option<mpsc::UnboundedReceiver<ChatSend>>>,
}

impl ChatRoom {
    pub fn new(
        session: Session,
        me: i64,
        peer: i64,
        updates: broadcast::Sender<UiEvent>,
    ) -> Self {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        Self {
            session,
            room: room_name(me, peer),
            me,
            peer,
            thread: Arc::new(Mutex::new(ChatThread::default())),
            updates,
            out_tx,
            out_rx: Mutex::new(Some(out_rx)),
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    /// Snapshot of the thread as it stands.
    pub fn thread(&self) -> ChatThread {
        self.thread.lock().clone()
    }

    /// Queues a text frame for the session task. The server's echo, not
    /// this call, appends the line to the thread. Blank drafts are
    /// dropped before they reach the wire.
    pub fn send_text(&self, text: &str) -> Result<(), ClientError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let frame = ChatSend {
            message: text.to_string(),
            receiver_id: self.peer,
            file_data: None,
            file_name: None,
            file_type: None,
        };
        self.out_tx
            .send(frame)
            .map_err(|_| ClientError::ChannelClosed)
    }

    /// Drives one socket session for this room: outbound frames drain
    /// from the send queue, inbound frames append to the thread. Single
    /// session, no reconnect, same contract as the notification channel.
    pub async fn run(&self) -> Result<(), ClientError> {
        let rx = self.out_rx.lock().take();
        let Some(mut rx) = rx else {
            return Err(ClientError::Other(anyhow::anyhow!(
                "Chat session already started for {}",
                self.room
            )));
        };

        let url = self.session.config().chat_socket(&self.room);
        self.set_state(ChannelState::Connecting);
        info!("Connecting chat room {} to {}", self.room, url);

        let ws_stream = match connect_async(url.as_str()).await {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                error!("Chat room {} failed to connect: {}", self.room, e);
                self.set_state(ChannelState::Errored);
                return Err(e.into());
            }
        };
        self.set_state(ChannelState::Open);

        let (mut write, mut read) = ws_stream.split();
        let mut outbound_open = true;

        loop {
            tokio::select! {
                outbound = rx.recv(), if outbound_open => {
                    match outbound {
                        Some(frame) => {
                            let data = match serde_json::to_string(&frame) {
                                Ok(data) => data,
                                Err(e) => {
                                    warn!("Skipping unencodable chat frame: {}", e);
                                    continue;
                                }
                            };
                            if let Err(e) = write.send(Message::Text(data)).await {
                                error!("Chat room {} send failed: {}", self.room, e);
                                self.set_state(ChannelState::Errored);
                                return Err(e.into());
                            }
                        }
                        None => outbound_open = false,
                    }
                }
                inbound = read.next() => {
                    match inbound {
                        Some(Ok(Message::Text(data))) => match read_event(&data) {
                            Ok(event) => self.apply_event(&event),
                            Err(e) => {
                                warn!("Skipping undecodable chat frame: {}", e);
                            }
                        },
                        Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                        Some(Ok(Message::Close(frame))) => {
                            info!("Chat room {} closed: {:?}", self.room, frame);
                            break;
                        }
                        Some(Ok(msg)) => {
                            warn!("Unexpected message type: {:?}", msg);
                        }
                        Some(Err(e)) => {
                            error!("Chat room {} error: {}", self.room, e);
                            self.set_state(ChannelState::Errored);
                            return Err(e.into());
                        }
                        None => break,
                    }
                }
            }
        }

        self.set_state(ChannelState::Closed);
        Ok(())
    }

    /// Pulls the stored conversation and replaces the thread wholesale,
    /// oldest first. Channel state is left alone; history and the live
    /// session are independent.
    pub async fn load_history(&self) -> Result<usize, ClientError> {
        let url = self.session.config().chat_history_endpoint(self.peer);
        let resp = self.session.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        let history = resp.json::<Vec<ChatHistoryMessage>>().await?;
        let count = history.len();

        let lines: Vec<ChatLine> = history
            .into_iter()
            .map(|m| ChatLine {
                message_id: m.id,
                sender_id: m.sender_id,
                mine: m.sender_id == self.me,
                text: m.message,
                time_label: time_label(&m.timestamp),
                attachment: None,
            })
            .collect();
        self.thread.lock().lines = lines;

        let _ = self
            .updates
            .send(UiEvent::ChatHistoryLoaded {
                room: self.room.clone(),
                count,
            })
            .ok();
        Ok(count)
    }

    fn apply_event(&self, event: &ChatEvent) {
        let line = ChatLine {
            message_id: event.id,
            sender_id: event.sender_id,
            mine: event.sender_id == self.me,
            text: event.message.clone(),
            time_label: time_label(&event.timestamp),
            attachment: event.file_data.clone(),
        };
        self.thread.lock().lines.push(line);
        let _ = self
            .updates
            .send(UiEvent::ChatMessage {
                room: self.room.clone(),
                sender_id: event.sender_id,
                text: event.message.clone(),
            })
            .ok();
    }

    fn set_state(&self, state: ChannelState) {
        self.thread.lock().state = state;
        let _ = self
            .updates
            .send(UiEvent::ChatChannelChanged {
                room: self.room.clone(),
                state,
            })
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn fixture() -> ChatRoom {
        let config =
            ClientConfig::new("http://localhost:8000", "ws://localhost:8000", "token").unwrap();
        let session = Session::new(config).unwrap();
        let (tx, _) = broadcast::channel(64);
        ChatRoom::new(session, 3, 1, tx)
    }

    #[test]
    fn test_room_name_is_order_independent() {
        assert_eq!(room_name(1, 3), "chat_1_3");
        assert_eq!(room_name(3, 1), "chat_1_3");
        assert_eq!(room_name(7, 7), "chat_7_7");
    }

    #[test]
    fn test_time_label_variants() {
        assert_eq!(time_label("2025-06-01T09:30:12.000415"), "09:30");
        assert_eq!(time_label("2025-06-01T09:30:12"), "09:30");
        assert_eq!(time_label("2025-06-01T09:30:12.000415+00:00"), "09:30");
        assert_eq!(time_label("not a timestamp"), "just now");
    }

    #[test]
    fn test_send_drops_blank_drafts() {
        let room = fixture();
        room.send_text("   ").unwrap();
        room.send_text("").unwrap();
        room.send_text("hello").unwrap();

        let mut rx = room.out_rx.lock().take().unwrap();
        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.message, "hello");
        assert_eq!(frame.receiver_id, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_never_appends_locally() {
        let room = fixture();
        room.send_text("hello").unwrap();
        assert!(room.thread().lines.is_empty());
    }

    #[test]
    fn test_echo_appends_with_ownership() {
        let room = fixture();
        room.apply_event(&ChatEvent {
            id: 41,
            message: "hello".to_string(),
            file_data: None,
            file_type: None,
            sender_id: 3,
            receiver_id: 1,
            timestamp: "2025-06-01T09:30:12.000415".to_string(),
        });
        room.apply_event(&ChatEvent {
            id: 42,
            message: "hi back".to_string(),
            file_data: None,
            file_type: None,
            sender_id: 1,
            receiver_id: 3,
            timestamp: "2025-06-01T09:31:02.000415".to_string(),
        });

        let thread = room.thread();
        assert_eq!(thread.lines.len(), 2);
        assert!(thread.lines[0].mine);
        assert!(!thread.lines[1].mine);
        assert_eq!(thread.lines[0].time_label, "09:30");
    }
}
