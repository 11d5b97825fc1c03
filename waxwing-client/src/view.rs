use std::collections::HashMap;

use crate::disclosure::Disclosure;

/// Lifecycle of one push socket session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// Channels dial as soon as the page exists.
    #[default]
    Connecting,
    Open,
    /// Server ended the stream normally.
    Closed,
    /// Stream died with a transport error.
    Errored,
}

/// One row of the notification panel. `Empty` is the placeholder the
/// pull path installs when the server list comes back empty; the push
/// path prepends above it and never removes it.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEntry {
    Item { message: String, time: String },
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentLine {
    pub author: String,
    pub text: String,
    pub posted_label: String,
}

/// Everything one post renders from. Counts are server-authoritative;
/// the flags are client-side presentation state.
#[derive(Debug, Clone, PartialEq)]
pub struct PostCard {
    pub liked: bool,
    pub like_count: i64,
    pub like_disabled: bool,
    pub comments: Vec<CommentLine>,
    pub comment_count: i64,
    pub comment_form: Disclosure,
    pub comment_draft: String,
    pub full_comments: Disclosure,
    pub expand_label: String,
}

impl PostCard {
    pub fn new(seed: PostSeed) -> Self {
        let mut card = Self {
            liked: seed.liked,
            like_count: seed.like_count,
            like_disabled: false,
            comments: seed.comments,
            comment_count: seed.comment_count,
            comment_form: Disclosure::hidden(),
            comment_draft: String::new(),
            full_comments: Disclosure::hidden(),
            expand_label: String::new(),
        };
        card.refresh_expand_label();
        card
    }

    /// Recomputes the expand affordance label from the card's own state.
    /// The label is stored at toggle time, not derived at render time,
    /// so it can lag the list until the next toggle.
    pub fn refresh_expand_label(&mut self) {
        self.expand_label = if self.full_comments.is_visible() {
            "Hide comments".to_string()
        } else {
            format!("View more comments ({})", self.comments.len())
        };
    }
}

/// Server-rendered initial state for one post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostSeed {
    pub post_id: String,
    pub liked: bool,
    pub like_count: i64,
    pub comments: Vec<CommentLine>,
    pub comment_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPanel {
    pub open: bool,
    pub unread: u32,
    pub entries: Vec<NotificationEntry>,
    pub channel: ChannelState,
}

impl Default for NotificationPanel {
    fn default() -> Self {
        Self {
            open: false,
            unread: 0,
            entries: Vec::new(),
            channel: ChannelState::Connecting,
        }
    }
}

/// The whole observable page: post cards by id, the notification panel,
/// and the two page-level surfaces (feed visibility, blocking alert).
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub posts: HashMap<String, PostCard>,
    pub panel: NotificationPanel,
    pub feed_visible: bool,
    pub alert: Option<String>,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            posts: HashMap::new(),
            panel: NotificationPanel::default(),
            feed_visible: true,
            alert: None,
        }
    }
}

/// One line of a direct-message thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLine {
    pub message_id: i64,
    pub sender_id: i64,
    pub mine: bool,
    pub text: String,
    pub time_label: String,
    pub attachment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatThread {
    pub lines: Vec<ChatLine>,
    pub state: ChannelState,
}

impl Default for ChatThread {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            state: ChannelState::Connecting,
        }
    }
}

/// Fine-grained change notifications fanned out to whatever renders the
/// page. Every mutation of the shared view emits exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    LikePending {
        post_id: String,
        pending: bool,
    },
    LikeUpdated {
        post_id: String,
        liked: bool,
        likes_count: i64,
    },
    CommentAppended {
        post_id: String,
        author: String,
        text: String,
    },
    CommentCountChanged {
        post_id: String,
        count: i64,
    },
    CommentFormToggled {
        post_id: String,
        visible: bool,
    },
    CommentsExpanded {
        post_id: String,
        expanded: bool,
        label: String,
    },
    Alert {
        message: String,
    },
    NotificationArrived {
        message: String,
    },
    UnreadChanged {
        unread: u32,
    },
    PanelToggled {
        open: bool,
    },
    NotificationsReplaced {
        count: usize,
    },
    ChannelChanged {
        state: ChannelState,
    },
    ChatMessage {
        room: String,
        sender_id: i64,
        text: String,
    },
    ChatHistoryLoaded {
        room: String,
        count: usize,
    },
    ChatChannelChanged {
        room: String,
        state: ChannelState,
    },
}
