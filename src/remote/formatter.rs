//! Rendering of remote command results for the chat room.
//!
//! Answers are matched to their request by the command string they echo:
//! `!!stats ...` and `!!online` have dedicated payloads, anything else
//! issued from the chat room carries a plain success flag.

use serde::de::DeserializeOwned;

use crate::common::error::{RouteError, RouteResult};
use crate::common::{
    CommandAck, OnlineQueryResult, RemoteCommandResponse, RemoteCommandResult, StatsQueryResult,
};

const STATS_PREFIX: &str = "!!stats ";
const ONLINE_COMMAND: &str = "!!online";

pub const STATS_NOT_FOUND: &str = "统计信息未找到";
pub const STATS_PLUGIN_MISSING: &str = "StatsHelper 插件未加载";
pub const COMMAND_EXECUTED: &str = "命令已执行";
pub const SERVER_NOT_RUNNING: &str = "Minecraft服务器未在运行，请稍后再试";

/// Decode the payload of an answered command we are interested in.
///
/// `Ok(None)` means the response is not for the chat room: an unanswered
/// echo, or a command some other consumer issued.
pub fn classify(response: &RemoteCommandResponse) -> RouteResult<Option<RemoteCommandResult>> {
    if !response.responded {
        return Ok(None);
    }

    let result = if response.command.starts_with(STATS_PREFIX) {
        RemoteCommandResult::Stats(decode(response)?)
    } else if response.command == ONLINE_COMMAND {
        RemoteCommandResult::Online(decode(response)?)
    } else if response.from_chatroom() {
        RemoteCommandResult::GenericAck(decode(response)?)
    } else {
        return Ok(None);
    };
    Ok(Some(result))
}

fn decode<T: DeserializeOwned>(response: &RemoteCommandResponse) -> RouteResult<T> {
    T::deserialize(&response.result).map_err(|source| RouteError::MalformedResult {
        command: response.command.clone(),
        source,
    })
}

/// Chat-room text for a result, if it has one.
pub fn render(result: &RemoteCommandResult) -> Option<String> {
    match result {
        RemoteCommandResult::Stats(stats) => render_stats(stats),
        RemoteCommandResult::Online(online) => Some(format!(
            "====== 玩家列表 ======\n{}",
            online.data.join("\n")
        )),
        RemoteCommandResult::GenericAck(CommandAck { success }) => Some(
            if *success {
                COMMAND_EXECUTED
            } else {
                SERVER_NOT_RUNNING
            }
            .to_string(),
        ),
    }
}

fn render_stats(stats: &StatsQueryResult) -> Option<String> {
    if stats.success {
        let mut lines = Vec::with_capacity(stats.data.len() + 2);
        lines.push(format!("====== {} ======", stats.stats_name));
        lines.extend(stats.data.iter().cloned());
        lines.push(format!("总数：{}", stats.total));
        return Some(lines.join("\n"));
    }
    match stats.error_code {
        1 => Some(STATS_NOT_FOUND.to_string()),
        2 => Some(STATS_PLUGIN_MISSING.to_string()),
        _ => None,
    }
}

/// Classify and render in one step.
pub fn format_response(response: &RemoteCommandResponse) -> RouteResult<Option<String>> {
    Ok(classify(response)?.as_ref().and_then(render))
}
