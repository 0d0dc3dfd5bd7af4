//! Text pipeline for relayed messages.
//!
//! Unescapes and sanitizes chat-room text before it leaves for the remote
//! side, and splits long outgoing chat-room text on line boundaries.

use std::sync::LazyLock;

use fancy_regex::Regex;
use tracing::warn;

/// Placeholder for rich content (images, faces, replies...) that cannot be
/// shown on the remote side.
pub const UNSUPPORTED_PLACEHOLDER: &str = "[不支持的消息格式]";

static RICH_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[CQ:(\w+)(,(\w+)=(.*?))*\]").expect("rich content pattern is valid")
});

static JOIN_LEAVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+ (joined|left) .+").expect("join/leave pattern is valid"));

/// Replace every `[CQ:type,key=value,...]` marker with the placeholder.
pub fn sanitize_rich_content(text: &str) -> String {
    RICH_CONTENT
        .replace_all(text, UNSUPPORTED_PLACEHOLDER)
        .into_owned()
}

/// Whether a remote message is a "<player> joined/left <server>" notice.
pub fn is_join_leave_notice(text: &str) -> bool {
    JOIN_LEAVE.is_match(text.trim()).unwrap_or_else(|e| {
        warn!("Join/leave match error: {}", e);
        false
    })
}

/// Whether `text` is longer than `max_len` characters. A zero limit means
/// unlimited.
pub fn exceeds_limit(text: &str, max_len: usize) -> bool {
    max_len > 0 && text.chars().count() > max_len
}

/// Prefix chat-room output with the name of the side it came from.
pub fn attribute(sender: &str, text: &str) -> String {
    format!("[{}] {}", sender, text)
}

/// Split `text` into chunks of whole lines of at most `limit` characters.
///
/// Line endings stay with their line, so concatenating the chunks gives
/// back `text`. A single line longer than `limit` becomes its own chunk
/// and is never split.
pub fn chunk(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut length = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if !current.is_empty() && length + line_len > limit {
            chunks.push(std::mem::take(&mut current));
            length = 0;
        }
        current.push_str(line);
        length += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Decode HTML character references.
///
/// Handles the named entities OneBot and common clients emit plus decimal
/// and hex numeric references (`&#91;` is how a literal `[` arrives).
/// Unknown or malformed references are kept verbatim.
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        let decoded = candidate
            .char_indices()
            .take(12)
            .find(|&(_, c)| c == ';')
            .and_then(|(semi, _)| decode_entity(&candidate[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}
