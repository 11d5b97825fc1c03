use serde::{Deserialize, Serialize};

/// Server verdict after a like toggle. `liked` is the authoritative
/// membership after the flip, `likes_count` the authoritative total.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes_count: i64,
}

/// Accepted comment. `created_at` is the server-side timestamp string;
/// older server builds omit it, so the renderer falls back to a relative
/// label when it is absent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommentAccepted {
    pub user: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    pub comments_count: i64,
}

/// Validation rejection. The comment endpoint reports these in the body
/// (possibly alongside a 4xx status) rather than as a bare HTTP error.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommentRejected {
    pub error: String,
}

/// The comment endpoint returns one of two disjoint body shapes. The
/// rejection arm is listed first: a body carrying `error` must classify
/// as rejected no matter what the HTTP status said.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CommentResponse {
    Rejected(CommentRejected),
    Accepted(CommentAccepted),
}
