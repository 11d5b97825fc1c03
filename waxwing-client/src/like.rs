use crate::error::ClientError;
use crate::session::Session;
use crate::view::{PageView, UiEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error};
use waxwing_lexicon::feed::LikeResponse;

/// Outcome of an activation that made it through the fence.
#[derive(Debug, Clone, PartialEq)]
pub enum LikeToggle {
    /// Server verdict, already applied to the card.
    Applied { liked: bool, likes_count: i64 },
    /// A toggle for this post was still in flight; nothing was sent.
    InFlight,
}

/// Drives the like control for every post on the page. One round trip
/// per post may be outstanding at a time; the fence below is the only
/// thing that enforces it.
#[derive(Clone)]
pub struct LikeButtons {
    session: Session,
    view: Arc<Mutex<PageView>>,
    pending: Arc<Mutex<HashSet<String>>>,
    updates: broadcast::Sender<UiEvent>,
}

impl LikeButtons {
    pub fn new(
        session: Session,
        view: Arc<Mutex<PageView>>,
        updates: broadcast::Sender<UiEvent>,
    ) -> Self {
        Self {
            session,
            view,
            pending: Arc::new(Mutex::new(HashSet::new())),
            updates,
        }
    }

    /// Flips the like state of `post_id` against the server. The local
    /// flag and count change only after the server answers; no optimistic
    /// write happens here. Duplicate activations while a round trip is
    /// outstanding return `InFlight` without touching the network.
    pub async fn toggle(&self, post_id: &str) -> Result<LikeToggle, ClientError> {
        if !self.pending.lock().insert(post_id.to_string()) {
            debug!("Like toggle already in flight for post {}", post_id);
            return Ok(LikeToggle::InFlight);
        }
        self.set_disabled(post_id, true);

        // The fence must be released no matter how the request ends, so
        // the outcome is held and only inspected after the release.
        let outcome = self.request(post_id).await;

        self.pending.lock().remove(post_id);
        self.set_disabled(post_id, false);

        match outcome {
            Ok(verdict) => {
                self.apply(post_id, &verdict);
                Ok(LikeToggle::Applied {
                    liked: verdict.liked,
                    likes_count: verdict.likes_count,
                })
            }
            Err(e) => {
                error!("Like request failed for post {}: {}", post_id, e);
                Err(e)
            }
        }
    }

    pub fn is_pending(&self, post_id: &str) -> bool {
        self.pending.lock().contains(post_id)
    }

    async fn request(&self, post_id: &str) -> Result<LikeResponse, ClientError> {
        let url = self.session.config().like_endpoint(post_id);
        let resp = self.session.post(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(resp.json::<LikeResponse>().await?)
    }

    fn set_disabled(&self, post_id: &str, disabled: bool) {
        let changed = {
            let mut view = self.view.lock();
            match view.posts.get_mut(post_id) {
                Some(card) => {
                    card.like_disabled = disabled;
                    true
                }
                None => false,
            }
        };
        if changed {
            let _ = self
                .updates
                .send(UiEvent::LikePending {
                    post_id: post_id.to_string(),
                    pending: disabled,
                })
                .ok();
        }
    }

    fn apply(&self, post_id: &str, verdict: &LikeResponse) {
        let changed = {
            let mut view = self.view.lock();
            match view.posts.get_mut(post_id) {
                Some(card) => {
                    card.liked = verdict.liked;
                    card.like_count = verdict.likes_count;
                    true
                }
                None => false,
            }
        };
        if changed {
            let _ = self
                .updates
                .send(UiEvent::LikeUpdated {
                    post_id: post_id.to_string(),
                    liked: verdict.liked,
                    likes_count: verdict.likes_count,
                })
                .ok();
        }
    }
}
