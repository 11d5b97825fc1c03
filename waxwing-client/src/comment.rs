use crate::error::ClientError;
use crate::session::Session;
use crate::view::{CommentLine, PageView, UiEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error};
use waxwing_lexicon::feed::{CommentAccepted, CommentRejected, CommentResponse};

/// Outcome of a comment submission that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentSubmit {
    Posted { comments_count: i64 },
    Rejected { reason: String },
}

/// Drives the per-post comment form. Unlike the like control there is no
/// in-flight fence on this path: a second submit while one is
/// outstanding fires a second request. Known double-submit hazard,
/// kept as-is.
#[derive(Clone)]
pub struct CommentComposer {
    session: Session,
    view: Arc<Mutex<PageView>>,
    updates: broadcast::Sender<UiEvent>,
}

impl CommentComposer {
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

    /// Replaces the draft text of `post_id`, the way typing does.
    pub fn set_draft(&self, post_id: &str, text: &str) {
        let mut view = self.view.lock();
        if let Some(card) = view.posts.get_mut(post_id) {
            card.comment_draft = text.to_string();
        }
    }

    /// Submits the current draft. Acceptance appends the confirmed
    /// comment, adopts the server count, clears the draft and collapses
    /// the form. A validation rejection raises the page alert and leaves
    /// everything else exactly as it was, the draft included, so the
    /// author can fix and resubmit. An id with no card on the page has
    /// no draft to send: the submit is dropped with `Ok(None)` before
    /// any request is built, matching the page-level unknown-id no-ops.
    pub async fn submit(&self, post_id: &str) -> Result<Option<CommentSubmit>, ClientError> {
        let draft = {
            let view = self.view.lock();
            match view.posts.get(post_id) {
                Some(card) => card.comment_draft.clone(),
                None => {
                    debug!("No card for post {}; comment submit dropped", post_id);
                    return Ok(None);
                }
            }
        };

        let outcome = self.request(post_id, &draft).await;

        match outcome {
            Ok(CommentResponse::Accepted(accepted)) => {
                self.apply_accepted(post_id, &accepted);
                Ok(Some(CommentSubmit::Posted {
                    comments_count: accepted.comments_count,
                }))
            }
            Ok(CommentResponse::Rejected(rejected)) => {
                self.apply_rejected(&rejected);
                Ok(Some(CommentSubmit::Rejected {
                    reason: rejected.error,
                }))
            }
            Err(e) => {
                error!("Comment submit failed for post {}: {}", post_id, e);
                Err(e)
            }
        }
    }

    async fn request(&self, post_id: &str, draft: &str) -> Result<CommentResponse, ClientError> {
        let url = self.session.config().comment_endpoint(post_id);
        let resp = self
            .session
            .post(&url)
            .form(&[("text", draft)])
            .send()
            .await?;
        // The server reports validation problems in the body, sometimes
        // with a 4xx status attached. The body shape decides, never the
        // status code.
        let body = resp.text().await?;
        serde_json::from_str::<CommentResponse>(&body).map_err(|e| {
            ClientError::Serialization(format!("Comment response {:?}: {}", body, e))
        })
    }

    fn apply_accepted(&self, post_id: &str, accepted: &CommentAccepted) {
        let applied = {
            let mut view = self.view.lock();
            match view.posts.get_mut(post_id) {
                Some(card) => {
                    // The confirmed line renders a relative label; the
                    // server timestamp is carried on the wire type but
                    // not shown for fresh comments.
                    card.comments.push(CommentLine {
                        author: accepted.user.clone(),
                        text: accepted.text.clone(),
                        posted_label: "just now".to_string(),
                    });
                    card.comment_count = accepted.comments_count;
                    card.comment_draft.clear();
                    card.comment_form.hide();
                    true
                }
                None => false,
            }
        };
        if applied {
            let _ = self
                .updates
                .send(UiEvent::CommentAppended {
                    post_id: post_id.to_string(),
                    author: accepted.user.clone(),
                    text: accepted.text.clone(),
                })
                .ok();
            let _ = self
                .updates
                .send(UiEvent::CommentCountChanged {
                    post_id: post_id.to_string(),
                    count: accepted.comments_count,
                })
                .ok();
            let _ = self
                .updates
                .send(UiEvent::CommentFormToggled {
                    post_id: post_id.to_string(),
                    visible: false,
                })
                .ok();
        }
    }

    fn apply_rejected(&self, rejected: &CommentRejected) {
        self.view.lock().alert = Some(rejected.error.clone());
        let _ = self
            .updates
            .send(UiEvent::Alert {
                message: rejected.error.clone(),
            })
            .ok();
    }
}
