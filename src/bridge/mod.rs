//! Core bridge building blocks shared by both routers.
//!
//! ## Module Structure
//!
//! - `access`: access lists and admin checks (`AccessPolicy`)
//! - `rate`: per-direction token buckets (`RateGate`)
//! - `text`: unescaping, sanitizing, length checks and chunking
//! - `boundary`: per-event error boundary and `Disposition`
//! - `context`: the shared `BridgeContext`
//! - `channels`: communication channel structures

pub mod access;
pub mod boundary;
pub mod channels;
pub mod context;
pub mod rate;
pub mod text;

// Re-export main types for convenience
pub use boundary::{Disposition, DropReason};
pub use channels::ChannelBundle;
pub use context::{BridgeContext, SharedContext};
pub use rate::RateDirection;
