use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, trace, warn};

use tether_types::events::{EVENT_SCHEMA_VERSION, GatewayFrame};
use tether_types::models::UserId;

use crate::dispatcher::Dispatcher;

const PING_EVERY: Duration = Duration::from_secs(15);
/// Consecutive unanswered pings before the device is considered gone.
const MAX_MISSED_PONGS: u8 = 2;

/// Run one device session for an already-identified user until the socket
/// closes or the heartbeat times out.
pub async fn handle_session(socket: WebSocket, dispatcher: Dispatcher, user_id: UserId) {
    let (mut sender, mut receiver) = socket.split();
    let (session_id, mut session_rx) = dispatcher.register_session(user_id);

    info!(
        "{} connected to gateway (session {}, {} device(s) online)",
        user_id,
        session_id,
        dispatcher.session_count(user_id)
    );

    let ready = GatewayFrame::Ready {
        user_id,
        session_id,
        version: EVENT_SCHEMA_VERSION,
    };
    if send_frame(&mut sender, &ready).await.is_err() {
        dispatcher.unregister_session(user_id, session_id);
        return;
    }

    let answered = Arc::new(AtomicBool::new(true));
    let answered_by_device = answered.clone();

    let mut outbound = tokio::spawn(async move {
        let mut ping = tokio::time::interval(PING_EVERY);
        ping.tick().await;
        let mut unanswered: u8 = 0;

        loop {
            tokio::select! {
                frame = session_rx.recv() => {
                    // Dispatcher dropped the sender: session was unregistered
                    let Some(frame) = frame else { break };
                    if send_frame(&mut sender, &frame).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    unanswered = if answered.swap(false, Ordering::Acquire) { 0 } else { unanswered + 1 };
                    if unanswered >= MAX_MISSED_PONGS {
                        warn!("Session {} of {} missed {} pongs, closing", session_id, user_id, unanswered);
                        break;
                    }
                    if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Push-only gateway: inbound frames only prove liveness
    let mut inbound = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Pong(_) => answered_by_device.store(true, Ordering::Release),
                Message::Close(_) => break,
                other => trace!("{} ignoring inbound frame: {:?}", user_id, other),
            }
        }
    });

    tokio::select! {
        _ = &mut outbound => inbound.abort(),
        _ = &mut inbound => outbound.abort(),
    }

    dispatcher.unregister_session(user_id, session_id);
    info!("{} disconnected from gateway (session {})", user_id, session_id);
}

async fn send_frame(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    frame: &GatewayFrame,
) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(frame) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to encode gateway frame: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await
}
