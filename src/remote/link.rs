//! Outbound handle to the remote ChatBridge network.
//!
//! The message-bus client itself (framing, encryption, reconnects) lives
//! outside this crate. It drains [`RemoteRequest`]s from a channel and keeps
//! the shared connectivity flag up to date.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::common::error::{RouteError, RouteResult};
use crate::common::{CommandMeta, RemoteRequest};

/// Operations the routers need from the remote link.
pub trait RemoteLink: Send + Sync {
    /// Cached connectivity of the bus client.
    fn is_online(&self) -> bool;

    /// Broadcast a chat message on behalf of `sender`.
    fn send_chat(&self, text: &str, sender: &str) -> RouteResult<()>;

    /// Ask bus client `client` to run `command`.
    fn send_command(
        &self,
        client: &str,
        command: &str,
        meta: Option<CommandMeta>,
    ) -> RouteResult<()>;
}

/// Channel-backed [`RemoteLink`].
#[derive(Debug, Clone)]
pub struct ChannelRemoteLink {
    request_tx: mpsc::UnboundedSender<RemoteRequest>,
    online: Arc<AtomicBool>,
}

impl ChannelRemoteLink {
    pub fn new(request_tx: mpsc::UnboundedSender<RemoteRequest>, online: Arc<AtomicBool>) -> Self {
        Self { request_tx, online }
    }

    fn send(&self, request: RemoteRequest) -> RouteResult<()> {
        debug!("Remote request: {:?}", request);
        self.request_tx
            .send(request)
            .map_err(|_| RouteError::RemoteClosed)
    }
}

impl RemoteLink for ChannelRemoteLink {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    fn send_chat(&self, text: &str, sender: &str) -> RouteResult<()> {
        self.send(RemoteRequest::Chat {
            text: text.to_string(),
            sender: sender.to_string(),
        })
    }

    fn send_command(
        &self,
        client: &str,
        command: &str,
        meta: Option<CommandMeta>,
    ) -> RouteResult<()> {
        self.send(RemoteRequest::Command {
            client: client.to_string(),
            command: command.to_string(),
            meta,
        })
    }
}
