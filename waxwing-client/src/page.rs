use crate::chat::ChatRoom;
use crate::comment::CommentComposer;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::like::LikeButtons;
use crate::notification::NotificationChannel;
use crate::session::Session;
use crate::view::{PageView, PostCard, PostSeed, UiEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the page's change-notification stream. A renderer that
/// falls this far behind misses events and should re-render from a
/// snapshot.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// One loaded page: the shared view, the controllers mutating it, and
/// the event stream renderers subscribe to. Pages are isolated; two
/// `FeedPage`s share nothing, not even configuration defaults.
#[derive(Clone)]
pub struct FeedPage {
    session: Session,
    view: Arc<Mutex<PageView>>,
    updates: broadcast::Sender<UiEvent>,
    likes: LikeButtons,
    comments: CommentComposer,
    notifications: NotificationChannel,
}

impl FeedPage {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let session = Session::new(config)?;
        let view = Arc::new(Mutex::new(PageView::default()));
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);

        let likes = LikeButtons::new(session.clone(), view.clone(), updates.clone());
        let comments = CommentComposer::new(session.clone(), view.clone(), updates.clone());
        let notifications =
            NotificationChannel::new(session.clone(), view.clone(), updates.clone());

        Ok(Self {
            session,
            view,
            updates,
            likes,
            comments,
            notifications,
        })
    }

    /// Subscribes to the page's change notifications. Dropping the
    /// receiver is the unsubscribe; nothing else holds the listener.
    pub fn updates(&self) -> broadcast::Receiver<UiEvent> {
        self.updates.subscribe()
    }

    /// Installs the server-rendered initial state for one post.
    pub fn seed_post(&self, seed: PostSeed) {
        let post_id = seed.post_id.clone();
        self.view.lock().posts.insert(post_id, PostCard::new(seed));
    }

    /// Clone of the view as it stands.
    pub fn snapshot(&self) -> PageView {
        self.view.lock().clone()
    }

    pub fn likes(&self) -> &LikeButtons {
        &self.likes
    }

    pub fn comments(&self) -> &CommentComposer {
        &self.comments
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    /// Opens a direct-message thread with `peer`, as user `me`. Each
    /// room owns its socket session and thread view but shares the page
    /// session and event stream.
    pub fn chat_room(&self, me: i64, peer: i64) -> ChatRoom {
        ChatRoom::new(self.session.clone(), me, peer, self.updates.clone())
    }

    /// Shows or hides the comment form of `post_id`. Pure presentation;
    /// no network and no timing involved.
    pub fn toggle_comment_form(&self, post_id: &str) -> Option<bool> {
        let visible = {
            let mut view = self.view.lock();
            let card = view.posts.get_mut(post_id)?;
            card.comment_form.toggle()
        };
        let _ = self
            .updates
            .send(UiEvent::CommentFormToggled {
                post_id: post_id.to_string(),
                visible,
            })
            .ok();
        Some(visible)
    }

    /// Expands or collapses the full comment list, recomputing the
    /// affordance label from the list as it stands at this moment.
    pub fn toggle_comments(&self, post_id: &str) -> Option<bool> {
        let (expanded, label) = {
            let mut view = self.view.lock();
            let card = view.posts.get_mut(post_id)?;
            let expanded = card.full_comments.toggle();
            card.refresh_expand_label();
            (expanded, card.expand_label.clone())
        };
        let _ = self
            .updates
            .send(UiEvent::CommentsExpanded {
                post_id: post_id.to_string(),
                expanded,
                label,
            })
            .ok();
        Some(expanded)
    }

    /// Pops the pending blocking alert, if any. Reading it clears the
    /// surface, the way dismissing a modal does.
    pub fn take_alert(&self) -> Option<String> {
        self.view.lock().alert.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::CommentLine;

    fn page() -> FeedPage {
        let config =
            ClientConfig::new("http://localhost:8000", "ws://localhost:8000", "token").unwrap();
        FeedPage::new(config).unwrap()
    }

    fn seeded_page() -> FeedPage {
        let page = page();
        page.seed_post(PostSeed {
            post_id: "7".to_string(),
            liked: false,
            like_count: 3,
            comments: vec![
                CommentLine {
                    author: "ada".to_string(),
                    text: "first".to_string(),
                    posted_label: "2025-06-01 09:30".to_string(),
                },
                CommentLine {
                    author: "grace".to_string(),
                    text: "second".to_string(),
                    posted_label: "2025-06-01 10:02".to_string(),
                },
            ],
            comment_count: 2,
        });
        page
    }

    #[test]
    fn test_toggle_comments_relabels_each_edge() {
        let page = seeded_page();

        assert_eq!(page.toggle_comments("7"), Some(true));
        assert_eq!(page.snapshot().posts["7"].expand_label, "Hide comments");

        assert_eq!(page.toggle_comments("7"), Some(false));
        assert_eq!(
            page.snapshot().posts["7"].expand_label,
            "View more comments (2)"
        );
    }

    #[test]
    fn test_toggle_comment_form_flips() {
        let page = seeded_page();
        assert_eq!(page.toggle_comment_form("7"), Some(true));
        assert!(page.snapshot().posts["7"].comment_form.is_visible());
        assert_eq!(page.toggle_comment_form("7"), Some(false));
        assert!(!page.snapshot().posts["7"].comment_form.is_visible());
    }

    #[test]
    fn test_unknown_post_toggles_are_noops() {
        let page = page();
        assert_eq!(page.toggle_comment_form("nope"), None);
        assert_eq!(page.toggle_comments("nope"), None);
    }

    #[test]
    fn test_take_alert_clears_surface() {
        let page = page();
        page.view.lock().alert = Some("Comment cannot be empty".to_string());
        assert_eq!(page.take_alert().as_deref(), Some("Comment cannot be empty"));
        assert_eq!(page.take_alert(), None);
    }

    #[test]
    fn test_pages_are_isolated() {
        let first = seeded_page();
        let second = FeedPage::new(
            ClientConfig::new("http://other.example", "ws://other.example", "other").unwrap(),
        )
        .unwrap();
        assert_eq!(first.snapshot().posts.len(), 1);
        assert!(second.snapshot().posts.is_empty());
        let mut rx = second.updates();
        first.toggle_comment_form("7");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_toggle_emits_events_to_subscribers() {
        let page = seeded_page();
        let mut rx = page.updates();

        page.toggle_comment_form("7");
        match rx.try_recv().unwrap() {
            UiEvent::CommentFormToggled { post_id, visible } => {
                assert_eq!(post_id, "7");
                assert!(visible);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
