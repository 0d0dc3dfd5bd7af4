//! Chat-room side of the bridge (QQ group over OneBot).
//!
//! ## Module Structure
//!
//! - `client`: WebSocket connection with reconnect loop
//! - `onebot`: OneBot event/action codec
//! - `router`: chat room -> remote routing
//! - `commands`: privileged and plain command tables
//! - `sender`: outbound chunked text

pub mod client;
pub mod commands;
pub mod onebot;
pub mod router;
pub mod sender;

pub use client::OneBotClient;
pub use router::ChatRoomRouter;
pub use sender::ChatRoomSender;
