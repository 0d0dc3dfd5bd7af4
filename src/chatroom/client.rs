//! OneBot WebSocket client.
//!
//! Keeps one connection to the OneBot endpoint alive, reconnecting with
//! exponential backoff. Decoded group messages go to the chat-room router;
//! queued outgoing text is posted to the relay group.

use std::time::Duration;

use backon::BackoffBuilder;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::bridge::channels::OneBotChannels;
use crate::common::error::TransportError;
use crate::config::types::OneBotConfig;

use super::onebot;

/// Exponential backoff for reconnection.
/// 1s initial, 5min max, factor 2, with jitter, unlimited retries.
fn reconnect_backoff() -> impl Iterator<Item = Duration> {
    backon::ExponentialBuilder::default()
        .with_min_delay(Duration::from_secs(1))
        .with_max_delay(Duration::from_secs(300))
        .with_factor(2.0)
        .with_jitter()
        .without_max_times()
        .build()
}

/// How a session ended.
enum SessionEnd {
    Disconnected,
    Shutdown,
}

pub struct OneBotClient {
    config: OneBotConfig,
    channels: OneBotChannels,
}

impl OneBotClient {
    pub fn new(config: OneBotConfig, channels: OneBotChannels) -> Self {
        Self { config, channels }
    }

    /// Connect and serve until shutdown is signalled.
    pub async fn run(mut self) {
        let mut backoff = reconnect_backoff();

        loop {
            if *self.channels.shutdown_rx.borrow() {
                break;
            }

            match self.run_session().await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Disconnected) => {
                    info!("OneBot connection closed");
                    backoff = reconnect_backoff();
                }
                Err(e) => error!("OneBot connection error: {}", e),
            }

            let delay = backoff.next().unwrap_or(Duration::from_secs(300));
            info!("Reconnecting to OneBot in {:.1} seconds...", delay.as_secs_f64());

            tokio::select! {
                _ = tokio::time::sleep(delay) => {},
                changed = self.channels.shutdown_rx.changed() => {
                    if changed.is_err() || *self.channels.shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
        info!("OneBot client stopped");
    }

    /// One connection, from handshake to close.
    async fn run_session(&mut self) -> Result<SessionEnd, TransportError> {
        let url = self.config.url();
        info!(
            "Connecting to OneBot at ws://{}:{}/ ...",
            self.config.ws_address, self.config.ws_port
        );

        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|source| TransportError::ConnectFailed {
                url: format!("ws://{}:{}/", self.config.ws_address, self.config.ws_port),
                source,
            })?;
        info!("Connected to OneBot, relaying group {}", self.config.group_id);

        let (mut sink, mut source) = stream.split();
        let channels = &mut self.channels;

        loop {
            tokio::select! {
                frame = source.next() => {
                    let Some(frame) = frame else {
                        return Ok(SessionEnd::Disconnected);
                    };
                    match frame? {
                        Message::Text(text) => match onebot::decode_event(text.as_str()) {
                            Ok(Some(event)) => {
                                if channels.event_tx.send(event).is_err() {
                                    warn!("Chat room router gone, closing OneBot session");
                                    return Ok(SessionEnd::Shutdown);
                                }
                            }
                            Ok(None) => {}
                            Err(e) => warn!("Undecodable OneBot frame: {}", e),
                        },
                        Message::Close(frame) => {
                            debug!("OneBot close frame: {:?}", frame);
                            return Ok(SessionEnd::Disconnected);
                        }
                        _ => {}
                    }
                }
                outgoing = channels.outgoing_rx.recv() => {
                    let Some(message) = outgoing else {
                        return Ok(SessionEnd::Shutdown);
                    };
                    let action = onebot::encode_send_group_msg(self.config.group_id, &message)?;
                    debug!("OneBot action: {}", action);
                    sink.send(Message::text(action)).await?;
                }
                changed = channels.shutdown_rx.changed() => {
                    if changed.is_err() || *channels.shutdown_rx.borrow() {
                        if let Err(e) = sink.close().await {
                            debug!("Error closing OneBot socket: {}", e);
                        }
                        return Ok(SessionEnd::Shutdown);
                    }
                }
            }
        }
    }
}
