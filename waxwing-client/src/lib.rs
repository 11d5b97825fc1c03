//! Client-side synchronization core for a social feed: like toggling
//! behind an in-flight fence, comment submission with validation
//! handling, a push-notification reconciler, direct-message rooms, and
//! pure disclosure state. Headless by construction: hosts subscribe to
//! [`view::UiEvent`]s and render [`view::PageView`] snapshots.

pub mod chat;
pub mod comment;
pub mod config;
pub mod disclosure;
pub mod error;
pub mod like;
pub mod notification;
pub mod page;
pub mod session;
pub mod view;

pub use crate::config::ClientConfig;
pub use crate::error::ClientError;
pub use crate::page::FeedPage;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
