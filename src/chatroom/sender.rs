//! Outbound chat-room handle.

use tokio::sync::mpsc;

use crate::bridge::text;
use crate::common::error::{RouteError, RouteResult};

/// Queues text for the relay group, one chunk per group message.
#[derive(Debug, Clone)]
pub struct ChatRoomSender {
    outgoing_tx: mpsc::UnboundedSender<String>,
    chunk_limit: usize,
}

impl ChatRoomSender {
    pub fn new(outgoing_tx: mpsc::UnboundedSender<String>, chunk_limit: usize) -> Self {
        Self {
            outgoing_tx,
            chunk_limit,
        }
    }

    /// Send `text`, split on line boundaries into messages of at most
    /// `chunk_limit` characters (a longer single line goes out whole).
    pub fn send_text(&self, text: &str) -> RouteResult<()> {
        for chunk in text::chunk(text.trim_end(), self.chunk_limit) {
            let message = chunk.trim_end_matches(['\r', '\n']).to_string();
            self.outgoing_tx
                .send(message)
                .map_err(|_| RouteError::ChatRoomClosed)?;
        }
        Ok(())
    }

    /// Send `text` attributed to `sender` as `[sender] text`.
    pub fn send_message(&self, sender: &str, text: &str) -> RouteResult<()> {
        self.send_text(&text::attribute(sender, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_short_text_one_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = ChatRoomSender::new(tx, 500);

        sender.send_text("pong!!\n\n").unwrap();
        assert_eq!(drain(&mut rx), vec!["pong!!"]);
    }

    #[test]
    fn test_long_text_split_on_lines() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = ChatRoomSender::new(tx, 12);

        sender.send_text("first line\nsecond line\nthird").unwrap();
        assert_eq!(
            drain(&mut rx),
            vec!["first line", "second line", "third"]
        );
    }

    #[test]
    fn test_empty_text_sends_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = ChatRoomSender::new(tx, 500);

        sender.send_text("  \n").unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_send_message_attributes_sender() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = ChatRoomSender::new(tx, 500);

        sender.send_message("survival", "<Steve> hi").unwrap();
        assert_eq!(drain(&mut rx), vec!["[survival] <Steve> hi"]);
    }

    #[test]
    fn test_closed_channel_is_an_error() {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        drop(rx);
        let sender = ChatRoomSender::new(tx, 500);
        assert!(matches!(
            sender.send_text("hi"),
            Err(RouteError::ChatRoomClosed)
        ));
    }
}
