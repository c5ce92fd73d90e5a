use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use order_sync::{BusError, ORDER_EVENTS_CHANNEL};
use serde_json::json;

/// Streams order lifecycle events to a presentation process so it can
/// refresh without waiting for its next poll. Delivery is best effort;
/// clients keep their polling backstop regardless.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut sub = state.bus.subscribe(ORDER_EVENTS_CHANNEL);
    loop {
        tokio::select! {
            event = sub.recv() => match event {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(err) => {
                            tracing::error!(%err, "failed to encode order event");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                Err(BusError::Lagged { missed }) => {
                    // The client missed events and should refetch
                    let notice = json!({"type": "lagged", "missed": missed}).to_string();
                    if socket.send(Message::Text(notice)).await.is_err() {
                        break;
                    }
                }
                Err(BusError::Unavailable) => break,
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
        }
    }
}
