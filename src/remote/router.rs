//! Remote -> chat room routing.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bridge::boundary::guarded;
use crate::bridge::{text, Disposition, DropReason, RateDirection, SharedContext};
use crate::common::error::RouteResult;
use crate::common::{RemoteChatEvent, RemoteCommandResponse};

use super::formatter;

/// Explicit chat-room relay trigger used from the remote side.
pub const RELAY_TRIGGER: &str = "!!qq";

/// Handles remote chat broadcasts and command answers.
pub struct RemoteRouter {
    ctx: SharedContext,
}

impl RemoteRouter {
    pub fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    /// Route one remote chat broadcast.
    pub fn handle_chat(&self, event: &RemoteChatEvent) -> Disposition {
        let disposition = guarded("remote chat", || self.dispatch_chat(event));
        debug!(
            client = %event.client,
            author = %event.author,
            ?disposition,
            "Remote chat: {}",
            event.message
        );
        disposition
    }

    fn dispatch_chat(&self, event: &RemoteChatEvent) -> RouteResult<Disposition> {
        if !self.ctx.access.remote_allowed(&event.author) {
            return Ok(Disposition::Dropped(DropReason::AccessDenied));
        }

        let relay = &self.ctx.config.relay;
        let message = event.message.trim();

        if relay.remote_to_chatroom_auto && !message.starts_with("!!") {
            if !relay.forward_join_leave && text::is_join_leave_notice(message) {
                return Ok(Disposition::Dropped(DropReason::JoinLeave));
            }
            return self.relay(event, &event.formatted());
        }

        match event.message.split_once(' ') {
            Some((RELAY_TRIGGER, body)) => {
                let explicit = RemoteChatEvent {
                    message: body.to_string(),
                    ..event.clone()
                };
                self.relay(event, &explicit.formatted())
            }
            _ => Ok(Disposition::Dropped(DropReason::Ignored)),
        }
    }

    fn relay(&self, event: &RemoteChatEvent, text: &str) -> RouteResult<Disposition> {
        if !self.ctx.rate.try_consume(RateDirection::ToChatroom) {
            warn!(client = %event.client, "Rate limited, dropping message to chat room");
            return Ok(Disposition::Dropped(DropReason::RateLimited));
        }
        if text::exceeds_limit(text, self.ctx.config.relay.remote_max_length) {
            warn!(client = %event.client, "Message too long, not forwarded to chat room");
            return Ok(Disposition::Dropped(DropReason::Oversize));
        }

        info!("Remote -> chat room: [{}] {}", event.client, text);
        self.ctx.chatroom.send_message(&event.client, text)?;
        Ok(Disposition::Forwarded)
    }

    /// Route one command answer.
    pub fn handle_response(&self, response: &RemoteCommandResponse) -> Disposition {
        guarded("remote command result", || {
            match formatter::format_response(response)? {
                Some(reply) => {
                    info!("Command result for \"{}\"", response.command);
                    self.ctx.chatroom.send_text(&reply)?;
                    Ok(Disposition::Replied)
                }
                None => Ok(Disposition::Dropped(DropReason::NotForUs)),
            }
        })
    }

    /// Drain remote events until both channels close.
    pub async fn run(
        self,
        mut chats: mpsc::UnboundedReceiver<RemoteChatEvent>,
        mut responses: mpsc::UnboundedReceiver<RemoteCommandResponse>,
    ) {
        info!("Remote router started");
        let (mut chats_open, mut responses_open) = (true, true);

        while chats_open || responses_open {
            tokio::select! {
                chat = chats.recv(), if chats_open => match chat {
                    Some(event) => {
                        self.handle_chat(&event);
                    }
                    None => chats_open = false,
                },
                response = responses.recv(), if responses_open => match response {
                    Some(response) => {
                        self.handle_response(&response);
                    }
                    None => responses_open = false,
                },
            }
        }
        info!("Remote router stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::bridge::BridgeContext;
    use crate::chatroom::sender::ChatRoomSender;
    use crate::config::test_config;
    use crate::config::types::{AccessMode, Config};
    use crate::remote::formatter::STATS_NOT_FOUND;
    use crate::remote::link::ChannelRemoteLink;

    struct Harness {
        router: RemoteRouter,
        outgoing: mpsc::UnboundedReceiver<String>,
    }

    impl Harness {
        fn new(config: Config) -> Self {
            let (outgoing_tx, outgoing) = mpsc::unbounded_channel();
            let (request_tx, _) = mpsc::unbounded_channel();

            let chatroom = ChatRoomSender::new(outgoing_tx, config.relay.chunk_limit);
            let remote = Arc::new(ChannelRemoteLink::new(
                request_tx,
                Arc::new(AtomicBool::new(true)),
            ));
            let ctx = Arc::new(BridgeContext::new(config, chatroom, remote));

            Self {
                router: RemoteRouter::new(ctx),
                outgoing,
            }
        }

        fn chat(&self, author: &str, message: &str) -> Disposition {
            self.router.handle_chat(&RemoteChatEvent {
                client: "survival".to_string(),
                author: author.to_string(),
                message: message.to_string(),
            })
        }

        fn sent(&mut self) -> Vec<String> {
            std::iter::from_fn(|| self.outgoing.try_recv().ok()).collect()
        }
    }

    fn response(value: serde_json::Value) -> RemoteCommandResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_auto_forward() {
        let mut h = Harness::new(test_config());

        assert_eq!(h.chat("Steve", "hello"), Disposition::Forwarded);
        assert_eq!(h.sent(), vec!["[survival] <Steve> hello"]);
    }

    #[test]
    fn test_bang_messages_not_auto_forwarded() {
        let mut h = Harness::new(test_config());

        assert_eq!(
            h.chat("Steve", "!!help"),
            Disposition::Dropped(DropReason::Ignored)
        );
        assert!(h.sent().is_empty());
    }

    #[test]
    fn test_explicit_relay() {
        let mut config = test_config();
        config.relay.remote_to_chatroom_auto = false;
        let mut h = Harness::new(config);

        assert_eq!(h.chat("Steve", "!!qq hi there"), Disposition::Forwarded);
        assert_eq!(
            h.chat("Steve", "plain chatter"),
            Disposition::Dropped(DropReason::Ignored)
        );
        assert_eq!(h.chat("Steve", "!!qq"), Disposition::Dropped(DropReason::Ignored));
        assert_eq!(h.sent(), vec!["[survival] <Steve> hi there"]);
    }

    #[test]
    fn test_join_leave_notices() {
        let mut config = test_config();
        config.relay.forward_join_leave = false;
        let mut h = Harness::new(config);

        assert_eq!(
            h.chat("", "Steve joined survival"),
            Disposition::Dropped(DropReason::JoinLeave)
        );
        assert!(h.sent().is_empty());

        let mut h = Harness::new(test_config());
        assert_eq!(h.chat("", "Steve left survival"), Disposition::Forwarded);
        assert_eq!(h.sent(), vec!["[survival] Steve left survival"]);
    }

    #[test]
    fn test_remote_access_list() {
        let mut config = test_config();
        config.access.remote.members.insert("Griefer".to_string());
        let mut h = Harness::new(config);

        assert_eq!(
            h.chat("Griefer", "hello"),
            Disposition::Dropped(DropReason::AccessDenied)
        );

        let mut config = test_config();
        config.access.remote.mode = AccessMode::Whitelist;
        config.access.remote.members.insert("Steve".to_string());
        let mut h2 = Harness::new(config);
        assert_eq!(h2.chat("Steve", "hello"), Disposition::Forwarded);
        assert_eq!(
            h2.chat("Alex", "hello"),
            Disposition::Dropped(DropReason::AccessDenied)
        );

        assert!(h.sent().is_empty());
        assert_eq!(h2.sent().len(), 1);
    }

    #[test]
    fn test_oversize_and_rate_limit() {
        let mut config = test_config();
        config.relay.remote_max_length = 12;
        config.rate_limit.to_chatroom.enabled = true;
        config.rate_limit.to_chatroom.rate = 0.01;
        config.rate_limit.to_chatroom.capacity = 2;
        let mut h = Harness::new(config);

        assert_eq!(h.chat("Steve", "hi"), Disposition::Forwarded);
        assert_eq!(
            h.chat("Steve", "this is far too long"),
            Disposition::Dropped(DropReason::Oversize)
        );
        assert_eq!(
            h.chat("Steve", "hi"),
            Disposition::Dropped(DropReason::RateLimited)
        );
        assert_eq!(h.sent(), vec!["[survival] <Steve> hi"]);
    }

    #[test]
    fn test_command_result_reply() {
        let mut h = Harness::new(test_config());

        let disposition = h.router.handle_response(&response(json!({
            "command": "!!stats rank used nothing",
            "result": {"success": false, "error_code": 1},
            "responded": true
        })));
        assert_eq!(disposition, Disposition::Replied);
        assert_eq!(h.sent(), vec![STATS_NOT_FOUND]);
    }

    #[test]
    fn test_long_result_chunked() {
        let mut config = test_config();
        config.relay.chunk_limit = 40;
        let mut h = Harness::new(config);

        let names: Vec<String> = (0..10).map(|i| format!("player_{:02}", i)).collect();
        h.router.handle_response(&response(json!({
            "command": "!!online",
            "result": {"data": names},
            "responded": true
        })));

        let sent = h.sent();
        assert!(sent.len() > 1);
        assert!(sent.iter().all(|m| m.chars().count() <= 40));
        assert_eq!(sent.join("\n").lines().count(), 11);
    }

    #[test]
    fn test_malformed_result_fails_quietly() {
        let mut h = Harness::new(test_config());

        let disposition = h.router.handle_response(&response(json!({
            "command": "!!online",
            "result": 42,
            "responded": true
        })));
        assert_eq!(disposition, Disposition::Failed);
        assert!(h.sent().is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_when_channels_close() {
        let Harness { router, mut outgoing } = Harness::new(test_config());
        let (chat_tx, chat_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel::<RemoteCommandResponse>();

        chat_tx
            .send(RemoteChatEvent {
                client: "lobby".to_string(),
                author: "Alex".to_string(),
                message: "hey".to_string(),
            })
            .unwrap();
        drop(chat_tx);
        drop(response_tx);

        router.run(chat_rx, response_rx).await;
        assert_eq!(outgoing.try_recv().unwrap(), "[lobby] <Alex> hey");
    }
}
