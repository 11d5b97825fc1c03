use crate::error::ClientError;
use crate::session::Session;
use crate::view::{ChannelState, NotificationEntry, PageView, UiEvent};
use futures_util::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info, warn};
use waxwing_lexicon::notification::{NotificationBatch, PushFrame};

/// Decodes one text frame off the push socket.
pub fn read_frame(data: &str) -> Result<PushFrame, ClientError> {
    serde_json::from_str::<PushFrame>(data)
        .map_err(|e| ClientError::Serialization(format!("Push frame {:?}: {}", data, e)))
}

/// Reconciles the notification panel against the server: pushed frames
/// arrive over one socket session, the stored list comes from a pull
/// each time the panel opens.
#[derive(Clone)]
pub struct NotificationChannel {
    session: Session,
    view: Arc<Mutex<PageView>>,
    updates: broadcast::Sender<UiEvent>,
}

impl NotificationChannel {
    pub fn new(
        session: Session,
        view: Arc<Mutex<PageView>>,
        updates: broadcast::Sender<UiEvent>,
    ) -> Self {
        Self {
            session,
            view,
            updates,
        }
    }

    /// Drives one socket session end to end: dial, consume frames until
    /// the server closes or the stream errors, record how it ended. No
    /// reconnect happens here; a supervisor that wants one wraps this
    /// call the way long-running subscribers do.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let url = self.session.config().notifications_socket();
        self.set_channel(ChannelState::Connecting);
        info!("Connecting notification channel to {}", url);

        let mut stream = match connect_async(url.as_str()).await {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                error!("Notification channel failed to connect: {}", e);
                self.set_channel(ChannelState::Errored);
                return Err(e.into());
            }
        };
        self.set_channel(ChannelState::Open);

        while let Some(msg_result) = stream.next().await {
            match msg_result {
                Ok(Message::Text(data)) => match read_frame(&data) {
                    Ok(frame) => self.apply_frame(&frame),
                    Err(e) => {
                        // A bad frame is dropped, not fatal to the session.
                        warn!("Skipping undecodable push frame: {}", e);
                    }
                },
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(frame)) => {
                    info!("Notification channel closed: {:?}", frame);
                    break;
                }
                Ok(msg) => {
                    warn!("Unexpected message type: {:?}", msg);
                }
                Err(e) => {
                    error!("Notification channel error: {}", e);
                    self.set_channel(ChannelState::Errored);
                    return Err(e.into());
                }
            }
        }

        self.set_channel(ChannelState::Closed);
        Ok(())
    }

    /// Applies one pushed notification: bump the unread counter, prepend
    /// the entry with a relative label when the frame has no time. The
    /// push path never removes an empty-state placeholder; only the next
    /// pull rebuilds the list.
    pub fn apply_frame(&self, frame: &PushFrame) {
        let unread = {
            let mut view = self.view.lock();
            view.panel.unread += 1;
            let time = frame
                .time
                .clone()
                .unwrap_or_else(|| "just now".to_string());
            view.panel.entries.insert(
                0,
                NotificationEntry::Item {
                    message: frame.message.clone(),
                    time,
                },
            );
            view.panel.unread
        };
        let _ = self.updates.send(UiEvent::UnreadChanged { unread }).ok();
        let _ = self
            .updates
            .send(UiEvent::NotificationArrived {
                message: frame.message.clone(),
            })
            .ok();
    }

    /// Flips the panel. The feed section always renders the inverse of
    /// the panel; the two are never visible together. Opening pulls the
    /// stored list; closing touches nothing else. The unread counter is
    /// left alone on both edges.
    pub async fn toggle_panel(&self) -> bool {
        let open = {
            let mut view = self.view.lock();
            view.panel.open = !view.panel.open;
            view.feed_visible = !view.panel.open;
            view.panel.open
        };
        let _ = self.updates.send(UiEvent::PanelToggled { open }).ok();

        if open {
            if let Err(e) = self.pull().await {
                // The stale list stays; the panel still opens.
                error!("Notification pull failed: {}", e);
            }
        }
        open
    }

    /// Fetches the stored list and installs it wholesale, replacing
    /// whatever the panel held, pushed entries from this session
    /// included. An empty reply installs exactly one placeholder row.
    pub async fn pull(&self) -> Result<(), ClientError> {
        let url = self.session.config().notifications_endpoint();
        let resp = self.session.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        let batch = resp.json::<NotificationBatch>().await?;
        let count = batch.notifications.len();

        {
            let mut view = self.view.lock();
            view.panel.entries = if batch.notifications.is_empty() {
                vec![NotificationEntry::Empty]
            } else {
                batch
                    .notifications
                    .into_iter()
                    .map(|n| NotificationEntry::Item {
                        message: n.message,
                        time: n.time,
                    })
                    .collect()
            };
        }
        let _ = self
            .updates
            .send(UiEvent::NotificationsReplaced { count })
            .ok();
        Ok(())
    }

    fn set_channel(&self, state: ChannelState) {
        self.view.lock().panel.channel = state;
        let _ = self.updates.send(UiEvent::ChannelChanged { state }).ok();
    }
}
