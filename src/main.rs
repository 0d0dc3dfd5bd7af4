//! chatbridge-cqhttp - QQ group <-> Minecraft ChatBridge relay
//!
//! Connects to a OneBot (CQHttp) endpoint and relays chat and commands
//! between one QQ group and the ChatBridge network.

mod bridge;
mod chatroom;
mod common;
mod config;
mod remote;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{debug, error, info, warn};

use bridge::{BridgeContext, ChannelBundle, RateDirection};
use chatroom::{ChatRoomRouter, ChatRoomSender, OneBotClient};
use config::{env::get_config_path, load_and_validate};
use remote::{ChannelRemoteLink, RemoteRouter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("chatbridge-cqhttp v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!(
        "  OneBot: ws://{}:{}/",
        config.onebot.ws_address, config.onebot.ws_port
    );
    info!("  Group: {}", config.onebot.group_id);
    info!("  Admins: {}", config.access.admins.len());
    info!(
        "  Auto relay: chat room -> remote {}, remote -> chat room {}",
        config.relay.chatroom_to_remote_auto, config.relay.remote_to_chatroom_auto
    );

    // ============================================================
    // Create channels and the shared context
    // ============================================================
    let channels = ChannelBundle::new();

    let chatroom = ChatRoomSender::new(channels.routers.outgoing_tx, config.relay.chunk_limit);
    let remote_link = Arc::new(ChannelRemoteLink::new(
        channels.routers.remote_request_tx,
        channels.bus.online.clone(),
    ));
    let ctx = Arc::new(BridgeContext::new(config.clone(), chatroom, remote_link));
    info!(
        "  Rate limits: chat room -> remote {}, remote -> chat room {}",
        ctx.rate.is_enabled(RateDirection::ToRemote),
        ctx.rate.is_enabled(RateDirection::ToChatroom)
    );

    // ============================================================
    // Spawn tasks
    // ============================================================
    let chatroom_task = tokio::spawn(
        ChatRoomRouter::new(ctx.clone()).run(channels.routers.chatroom_rx),
    );
    let remote_task = tokio::spawn(RemoteRouter::new(ctx).run(
        channels.routers.remote_chat_rx,
        channels.routers.remote_response_rx,
    ));

    // The bus client is attached externally; until then requests are only
    // logged and the link stays offline.
    warn!(
        "No ChatBridge bus client attached: nothing is relayed to the remote side, \
         and commands are answered with the offline reply"
    );
    let bus_task = {
        let bus = channels.bus;
        tokio::spawn(async move {
            let _chat_tx = bus.chat_tx;
            let _response_tx = bus.response_tx;
            let mut request_rx = bus.request_rx;
            while let Some(request) = request_rx.recv().await {
                debug!("Unsent remote request: {:?}", request);
            }
            info!("Remote request channel closed");
        })
    };

    let shutdown_tx = channels.control.shutdown_tx;
    let mut onebot_task = tokio::spawn(OneBotClient::new(config.onebot, channels.onebot).run());

    // ============================================================
    // Run until a task exits or a signal arrives
    // ============================================================
    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - closing connections...");
            true
        }
        _ = &mut onebot_task => false,
        _ = chatroom_task => false,
        _ = remote_task => false,
        _ = bus_task => false,
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            debug!("Shutdown channel closed (OneBot client already exited): {}", e);
        }
        let timeout = tokio::time::Duration::from_secs(5);
        match tokio::time::timeout(timeout, onebot_task).await {
            Ok(Ok(())) => info!("OneBot client closed gracefully"),
            Ok(Err(e)) => warn!("OneBot client task panicked: {}", e),
            Err(_) => warn!("OneBot client close timed out"),
        }
    }

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
