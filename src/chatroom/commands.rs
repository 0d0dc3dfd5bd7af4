//! Chat-room commands.
//!
//! Commands are declared in two tables: privileged sub-commands
//! (`#<op> <client> <args>`) and plain `!!` commands. Each entry carries its
//! matcher and handler, so adding a command means adding a row.

use tracing::info;

use crate::bridge::{BridgeContext, Disposition};
use crate::common::error::RouteResult;
use crate::common::{CommandKind, CommandMeta, InboundChatEvent};
use crate::config::types::CommandsConfig;

/// Prefix of privileged command lines.
pub const PRIVILEGED_PREFIX: char = '#';

/// Explicit chat relay trigger.
pub const RELAY_TRIGGER: &str = "!!mc";

pub const HELP_TEXT: &str = "!!help: 显示本条帮助信息
!!ping: pong!!
!!mc <消息>: 向 MC 中发送聊天信息 <消息>
!!online: 显示在线列表
!!stats <类别> <内容> [<-bot>]: 查询统计信息 <类别>.<内容> 的排名";

pub const STATS_HELP_TEXT: &str = "!!stats <类别> <内容> [<-bot>]
添加 `-bot` 来列出 bot
例子:
!!stats used diamond_pickaxe
!!stats custom time_since_rest -bot";

pub const PONG: &str = "pong!!";
pub const OFFLINE_REPLY: &str = "ChatBridge 客户端离线";
pub const REJECTED_REPLY: &str = "命令执行失败：格式错误或权限不足";
pub const INVALID_NAME_REPLY: &str = "非法的用户名！";

/// A chat-room message being matched against the command tables.
pub struct Invocation<'a> {
    pub ctx: &'a BridgeContext,
    pub event: &'a InboundChatEvent,
    /// Whitespace-separated tokens of the trimmed message.
    pub args: Vec<&'a str>,
    pub is_admin: bool,
}

impl<'a> Invocation<'a> {
    pub fn new(ctx: &'a BridgeContext, event: &'a InboundChatEvent) -> Self {
        Self {
            ctx,
            event,
            args: event.raw_text.split_whitespace().collect(),
            is_admin: ctx.access.is_admin(event.user_id),
        }
    }

    /// Answer in the chat room.
    fn reply(&self, text: &str) -> RouteResult<Disposition> {
        self.ctx.chatroom.send_text(text)?;
        Ok(Disposition::Replied)
    }

    /// Send `command` to bus client `client`, or tell the sender the link
    /// is offline.
    fn forward(
        &self,
        client: &str,
        command: &str,
        meta: Option<CommandMeta>,
    ) -> RouteResult<Disposition> {
        if !self.ctx.remote.is_online() {
            return self.reply(OFFLINE_REPLY);
        }
        info!("Sending command \"{}\" to client {}", command, client);
        self.ctx.remote.send_command(client, command, meta)?;
        Ok(Disposition::Forwarded)
    }
}

// ============================================================================
// Privileged sub-commands: `#<op> <client> <rest>`
// ============================================================================

/// Who may run a privileged sub-command.
#[derive(Clone, Copy)]
enum Privilege {
    Admin,
    /// Admins, or everyone when the config override is set.
    AdminOr(fn(&CommandsConfig) -> bool),
}

#[derive(Clone, Copy)]
enum PrivilegedAction {
    /// Forward `<rest>` unchanged.
    Raw(CommandKind),
    /// Validate `<rest>` as a player name and forward a built command.
    PlayerCommand(fn(&str) -> String),
}

struct PrivilegedCommand {
    aliases: &'static [&'static str],
    privilege: Privilege,
    action: PrivilegedAction,
}

const PRIVILEGED_COMMANDS: &[PrivilegedCommand] = &[
    PrivilegedCommand {
        aliases: &["/"],
        privilege: Privilege::Admin,
        action: PrivilegedAction::Raw(CommandKind::Vanilla),
    },
    PrivilegedCommand {
        aliases: &["!"],
        privilege: Privilege::Admin,
        action: PrivilegedAction::Raw(CommandKind::Framework),
    },
    PrivilegedCommand {
        aliases: &["离线", "offline"],
        privilege: Privilege::AdminOr(offline_registration_open),
        action: PrivilegedAction::PlayerCommand(offline_registration_command),
    },
    PrivilegedCommand {
        aliases: &["白名单", "whitelist"],
        privilege: Privilege::AdminOr(whitelist_open),
        action: PrivilegedAction::PlayerCommand(whitelist_command),
    },
];

fn offline_registration_open(config: &CommandsConfig) -> bool {
    config.allow_offline_registration_for_everyone
}

fn whitelist_open(config: &CommandsConfig) -> bool {
    config.allow_whitelist_for_everyone
}

fn offline_registration_command(player: &str) -> String {
    format!("auth addToForcedOffline {}", player)
}

fn whitelist_command(player: &str) -> String {
    format!("whitelist add {}", player)
}

/// Handle a `#` line with three tokens. Returns `None` when the line is not
/// a privileged command, so other matchers get a chance.
pub fn dispatch_privileged(inv: &Invocation) -> RouteResult<Option<Disposition>> {
    let Some(line) = inv.event.raw_text.trim().strip_prefix(PRIVILEGED_PREFIX) else {
        return Ok(None);
    };
    let [op, client, rest] = split_whitespace_max(line, 3)[..] else {
        return Ok(None);
    };

    let op = op.to_lowercase();
    let Some(command) = PRIVILEGED_COMMANDS
        .iter()
        .find(|c| c.aliases.contains(&op.as_str()))
    else {
        return inv.reply(REJECTED_REPLY).map(Some);
    };

    let permitted = match command.privilege {
        Privilege::Admin => inv.is_admin,
        Privilege::AdminOr(open) => inv.is_admin || open(&inv.ctx.config.commands),
    };
    if !permitted {
        info!(
            user_id = inv.event.user_id,
            "Privileged command '{}' rejected", op
        );
        return inv.reply(REJECTED_REPLY).map(Some);
    }

    let disposition = match command.action {
        PrivilegedAction::Raw(kind) => {
            info!("{:?} command triggered", kind);
            inv.forward(client, rest, Some(CommandMeta::chatroom(kind)))?
        }
        PrivilegedAction::PlayerCommand(build) => {
            let player = rest.trim();
            if !is_valid_player_name(player) {
                return inv.reply(INVALID_NAME_REPLY).map(Some);
            }
            info!("'{}' command triggered for {}", op, player);
            inv.forward(
                client,
                &build(player),
                Some(CommandMeta::chatroom(CommandKind::Vanilla)),
            )?
        }
    };
    Ok(Some(disposition))
}

/// Split on runs of whitespace into at most `max` parts; the last part keeps
/// the remainder of the line.
fn split_whitespace_max(s: &str, max: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s.trim();

    while !rest.is_empty() {
        if parts.len() + 1 == max {
            parts.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(rest);
                break;
            }
        }
    }
    parts
}

/// Minecraft player names: 3-16 characters of letters, digits and `_`.
pub fn is_valid_player_name(name: &str) -> bool {
    (3..=16).contains(&name.len()) && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ============================================================================
// Plain commands: `!!<name> ...`
// ============================================================================

#[derive(Clone, Copy)]
enum Arity {
    /// Exactly this many tokens, the command name included.
    Exact(usize),
    /// Any number of tokens; the handler validates.
    Any,
}

struct PlainCommand {
    name: &'static str,
    arity: Arity,
    handler: fn(&Invocation) -> RouteResult<Disposition>,
}

const PLAIN_COMMANDS: &[PlainCommand] = &[
    PlainCommand {
        name: "!!help",
        arity: Arity::Exact(1),
        handler: help,
    },
    PlainCommand {
        name: "!!ping",
        arity: Arity::Exact(1),
        handler: ping,
    },
    PlainCommand {
        name: "!!online",
        arity: Arity::Exact(1),
        handler: online,
    },
    PlainCommand {
        name: "!!stats",
        arity: Arity::Any,
        handler: stats,
    },
    PlainCommand {
        name: "!!killbot",
        arity: Arity::Exact(3),
        handler: killbot,
    },
];

/// Run the first plain command matching the message, if any.
pub fn dispatch_plain(inv: &Invocation) -> RouteResult<Option<Disposition>> {
    let Some(&first) = inv.args.first() else {
        return Ok(None);
    };

    let matched = PLAIN_COMMANDS.iter().find(|c| {
        c.name == first
            && match c.arity {
                Arity::Exact(n) => inv.args.len() == n,
                Arity::Any => true,
            }
    });

    match matched {
        Some(command) => {
            info!("{} command triggered", command.name);
            (command.handler)(inv).map(Some)
        }
        None => Ok(None),
    }
}

fn help(inv: &Invocation) -> RouteResult<Disposition> {
    inv.reply(HELP_TEXT)
}

fn ping(inv: &Invocation) -> RouteResult<Disposition> {
    inv.reply(PONG)
}

fn online(inv: &Invocation) -> RouteResult<Disposition> {
    let client = &inv.ctx.config.commands.online_query_client;
    inv.forward(client, "!!online", None)
}

/// `!!stats <category> <item> [-bot]`, forwarded as `!!stats rank ...`.
fn stats(inv: &Invocation) -> RouteResult<Disposition> {
    let params = &inv.args[1..];
    let with_bots = params.iter().any(|p| p.contains("-bot"));
    if inv.args.len() - usize::from(with_bots) != 3 {
        return inv.reply(STATS_HELP_TEXT);
    }

    let command = format!("!!stats rank {}", params.join(" "));
    let client = &inv.ctx.config.commands.stats_query_client;
    inv.forward(client, &command, None)
}

/// `!!killbot <client> <bot>`
fn killbot(inv: &Invocation) -> RouteResult<Disposition> {
    let command = format!("player {} kill", inv.args[2]);
    inv.forward(
        inv.args[1],
        &command,
        Some(CommandMeta::chatroom(CommandKind::Vanilla)),
    )
}
