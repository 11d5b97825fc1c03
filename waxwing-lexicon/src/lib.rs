//! Wire contracts spoken by the waxwing client: feed mutation endpoints,
//! the notification push channel, and the direct-message room channel.
//! Types only; transport lives in `waxwing-client`.

pub mod chat;
pub mod feed;
pub mod notification;
