//! Remote side of the bridge (ChatBridge network).
//!
//! - `link`: outbound requests and connectivity
//! - `router`: remote -> chat room routing
//! - `formatter`: command result rendering

pub mod formatter;
pub mod link;
pub mod router;

pub use link::ChannelRemoteLink;
pub use router::RemoteRouter;
