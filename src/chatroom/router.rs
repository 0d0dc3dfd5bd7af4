//! Chat room -> remote routing.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::bridge::boundary::guarded;
use crate::bridge::{text, Disposition, DropReason, RateDirection, SharedContext};
use crate::common::error::RouteResult;
use crate::common::InboundChatEvent;

use super::commands::{self, Invocation, RELAY_TRIGGER};

/// Decides what happens to every group message.
pub struct ChatRoomRouter {
    ctx: SharedContext,
}

impl ChatRoomRouter {
    pub fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    /// Route one chat-room event. Never fails; errors are logged.
    pub fn handle(&self, event: &InboundChatEvent) -> Disposition {
        let disposition = guarded("chat room event", || self.dispatch(event));
        debug!(
            user_id = event.user_id,
            ?disposition,
            "Chat room event: {}",
            event.raw_text
        );
        disposition
    }

    fn dispatch(&self, event: &InboundChatEvent) -> RouteResult<Disposition> {
        if event.group_id != self.ctx.config.onebot.group_id || event.anonymous {
            return Ok(Disposition::Dropped(DropReason::NotForUs));
        }
        if !self.ctx.access.chatroom_allowed(event.user_id) {
            return Ok(Disposition::Dropped(DropReason::AccessDenied));
        }

        let inv = Invocation::new(&self.ctx, event);

        if let Some(disposition) = commands::dispatch_privileged(&inv)? {
            return Ok(disposition);
        }
        if let Some(disposition) = commands::dispatch_plain(&inv)? {
            return Ok(disposition);
        }

        let explicit = inv.args.first() == Some(&RELAY_TRIGGER) && inv.args.len() >= 2;
        if explicit || self.ctx.config.relay.chatroom_to_remote_auto {
            return self.relay(&inv);
        }

        Ok(Disposition::Dropped(DropReason::Ignored))
    }

    /// Forward free text as a chat broadcast.
    fn relay(&self, inv: &Invocation) -> RouteResult<Disposition> {
        let event = inv.event;

        if !inv.is_admin && !self.ctx.rate.try_consume(RateDirection::ToRemote) {
            warn!(
                user_id = event.user_id,
                "Rate limited, dropping message to remote"
            );
            return Ok(Disposition::Dropped(DropReason::RateLimited));
        }

        let raw = event.raw_text.trim();
        let body = match raw.strip_prefix(RELAY_TRIGGER) {
            Some(rest) if inv.args.first() == Some(&RELAY_TRIGGER) => rest.trim_start(),
            _ => raw,
        };
        if body.is_empty() {
            return Ok(Disposition::Dropped(DropReason::Ignored));
        }

        let message = text::sanitize_rich_content(&text::unescape_html(body));
        if text::exceeds_limit(&message, self.ctx.config.relay.chatroom_max_length) {
            info!(
                user_id = event.user_id,
                "Message too long, not forwarded to remote"
            );
            return Ok(Disposition::Dropped(DropReason::Oversize));
        }

        let sender = event.display_name();
        info!("Chat room -> remote: [{}] {}", sender, message);
        self.ctx.remote.send_chat(&message, sender)?;
        Ok(Disposition::Forwarded)
    }

    /// Drain chat-room events until the channel closes.
    pub async fn run(self, mut rx: mpsc::UnboundedReceiver<InboundChatEvent>) {
        info!("Chat room router started");
        while let Some(event) = rx.recv().await {
            self.handle(&event);
        }
        info!("Chat room router stopped");
    }
}
