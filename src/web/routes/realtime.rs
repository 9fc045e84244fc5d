use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::Response,
    Extension,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::realtime::{ChannelName, Relay, SignalMessage};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

/// Upgrades to a websocket bound to one relay channel. Inboxes are
/// read-only; call channels accept signals from either participant.
pub async fn realtime_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(channel): Path<String>,
) -> Result<Response, AppError> {
    let channel = ChannelName::parse(&channel)
        .ok_or_else(|| AppError::BadRequest(format!("unknown channel '{}'", channel)))?;
    if !channel.allowed_for(&user.id) {
        return Err(AppError::Unauthorized);
    }

    let relay = state.relay.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, relay, channel, user.id)))
}

async fn handle_socket(socket: WebSocket, relay: Arc<Relay>, channel: ChannelName, user_id: String) {
    let key = channel.as_key();
    let writable = matches!(channel, ChannelName::Call(_));
    let mut subscription = relay.subscribe(&key);
    let (mut sender, mut receiver) = socket.split();
    info!(channel = %key, user = %user_id, "🔌 Realtime socket opened");

    loop {
        tokio::select! {
            outbound = subscription.recv() => {
                let Some(msg) = outbound else { break };
                if msg.from == user_id {
                    continue;
                }
                let Ok(text) = serde_json::to_string(&msg) else { continue };
                if sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) if writable => {
                        match serde_json::from_str::<SignalMessage>(&text) {
                            Ok(mut msg) => {
                                msg.from = user_id.clone();
                                relay.publish(&key, msg);
                            }
                            Err(e) => debug!(channel = %key, "ignoring malformed signal: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(channel = %key, "🔌 Socket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    info!(channel = %key, user = %user_id, "🔌 Realtime socket closed");
}
