//! OneBot v11 frame codec.
//!
//! Only the slice of the protocol the bridge needs: group message events
//! in, `send_group_msg` actions out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::InboundChatEvent;

#[derive(Debug, Deserialize)]
struct EventFrame {
    #[serde(default)]
    post_type: String,
    #[serde(default)]
    message_type: String,
    #[serde(default)]
    user_id: i64,
    #[serde(default)]
    group_id: i64,
    #[serde(default)]
    raw_message: String,
    #[serde(default)]
    anonymous: Option<Value>,
    #[serde(default)]
    sender: Option<Sender>,
}

#[derive(Debug, Default, Deserialize)]
struct Sender {
    #[serde(default)]
    card: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
}

#[derive(Debug, Serialize)]
struct Action<'a, P> {
    action: &'a str,
    params: P,
}

#[derive(Debug, Serialize)]
struct SendGroupMsg<'a> {
    group_id: i64,
    message: &'a str,
}

/// Decode one inbound frame.
///
/// Returns `Ok(None)` for anything that is not a group message (heartbeats,
/// lifecycle events, action responses, private messages).
pub fn decode_event(frame: &str) -> Result<Option<InboundChatEvent>, serde_json::Error> {
    let frame: EventFrame = serde_json::from_str(frame)?;
    if frame.post_type != "message" || frame.message_type != "group" {
        return Ok(None);
    }

    let sender = frame.sender.unwrap_or_default();
    Ok(Some(InboundChatEvent {
        user_id: frame.user_id,
        group_id: frame.group_id,
        card: sender.card.unwrap_or_default(),
        nickname: sender.nickname.unwrap_or_default(),
        raw_text: frame.raw_message,
        anonymous: frame.anonymous.is_some_and(|a| !a.is_null()),
    }))
}

/// Encode a `send_group_msg` action.
pub fn encode_send_group_msg(group_id: i64, message: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Action {
        action: "send_group_msg",
        params: SendGroupMsg { group_id, message },
    })
}
