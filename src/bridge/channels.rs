//! Bridge channel management.
//!
//! Provides communication channel structures for the bridge, grouping the
//! channels used by the OneBot transport, the routers and the remote bus
//! client.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::common::{InboundChatEvent, RemoteChatEvent, RemoteCommandResponse, RemoteRequest};

/// Channels for the OneBot WebSocket client.
pub struct OneBotChannels {
    /// Sender for decoded group messages (OneBot -> chat room router).
    pub event_tx: mpsc::UnboundedSender<InboundChatEvent>,
    /// Receiver for text to post in the group.
    pub outgoing_rx: mpsc::UnboundedReceiver<String>,
    /// Receiver for shutdown signal.
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Channels for the two routers.
pub struct RouterChannels {
    /// Receiver for chat-room group messages.
    pub chatroom_rx: mpsc::UnboundedReceiver<InboundChatEvent>,
    /// Sender for text to post in the group.
    pub outgoing_tx: mpsc::UnboundedSender<String>,
    /// Receiver for remote chat broadcasts.
    pub remote_chat_rx: mpsc::UnboundedReceiver<RemoteChatEvent>,
    /// Receiver for remote command answers.
    pub remote_response_rx: mpsc::UnboundedReceiver<RemoteCommandResponse>,
    /// Sender for requests to the remote network.
    pub remote_request_tx: mpsc::UnboundedSender<RemoteRequest>,
}

/// Channels for the remote message-bus client.
pub struct BusChannels {
    /// Sender for remote chat broadcasts.
    pub chat_tx: mpsc::UnboundedSender<RemoteChatEvent>,
    /// Sender for remote command answers.
    pub response_tx: mpsc::UnboundedSender<RemoteCommandResponse>,
    /// Receiver for requests to the remote network.
    pub request_rx: mpsc::UnboundedReceiver<RemoteRequest>,
    /// Connectivity flag, set by the bus client.
    pub online: Arc<AtomicBool>,
}

/// Control channels for shutdown coordination.
pub struct ControlChannels {
    /// Sender to trigger shutdown.
    pub shutdown_tx: watch::Sender<bool>,
}

/// Bundle of all channels created by the bridge.
pub struct ChannelBundle {
    pub onebot: OneBotChannels,
    pub routers: RouterChannels,
    pub bus: BusChannels,
    pub control: ControlChannels,
}

impl ChannelBundle {
    /// Create a new set of bridge channels.
    pub fn new() -> Self {
        let (event_tx, chatroom_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (chat_tx, remote_chat_rx) = mpsc::unbounded_channel();
        let (response_tx, remote_response_rx) = mpsc::unbounded_channel();
        let (remote_request_tx, request_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            onebot: OneBotChannels {
                event_tx,
                outgoing_rx,
                shutdown_rx,
            },
            routers: RouterChannels {
                chatroom_rx,
                outgoing_tx,
                remote_chat_rx,
                remote_response_rx,
                remote_request_tx,
            },
            bus: BusChannels {
                chat_tx,
                response_tx,
                request_rx,
                online: Arc::new(AtomicBool::new(false)),
            },
            control: ControlChannels { shutdown_tx },
        }
    }
}

impl Default for ChannelBundle {
    fn default() -> Self {
        Self::new()
    }
}
