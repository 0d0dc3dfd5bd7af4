//! Shared bridge context.
//!
//! Built once at startup and shared by both routers. Holds everything the
//! routing decisions depend on: config, access policy, rate gate and the
//! two outbound handles.

use std::sync::Arc;

use crate::bridge::access::AccessPolicy;
use crate::bridge::rate::RateGate;
use crate::chatroom::sender::ChatRoomSender;
use crate::config::types::Config;
use crate::remote::link::RemoteLink;

pub struct BridgeContext {
    pub config: Config,
    pub access: AccessPolicy,
    pub rate: RateGate,
    /// Outbound chat-room handle.
    pub chatroom: ChatRoomSender,
    /// Outbound remote handle.
    pub remote: Arc<dyn RemoteLink>,
}

impl BridgeContext {
    pub fn new(config: Config, chatroom: ChatRoomSender, remote: Arc<dyn RemoteLink>) -> Self {
        Self {
            access: AccessPolicy::new(&config.access),
            rate: RateGate::new(&config.rate_limit),
            config,
            chatroom,
            remote,
        }
    }
}

/// Shared context reference for use across async tasks.
pub type SharedContext = Arc<BridgeContext>;
