use crate::services::{
    auth::{Identity, Requester},
    socket::{ClientMessage, Session},
};
use crate::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info};

/**
 * upgrade to the subscription socket
 * the requester's identity is fixed for the life of the connection
 */
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Requester(identity): Requester,
    State(state): State<AppState>,
) -> impl IntoResponse {
    info!(
        "client connecting as {}",
        identity.as_ref().map_or("anonymous", |i| i.user_id.as_str())
    );
    ws.on_upgrade(move |socket| peer(socket, state, identity))
}

/**
 * pump client messages into the session and session messages out to the client
 */
async fn peer(ws: WebSocket, state: AppState, identity: Option<Identity>) {
    let (mut sink, mut stream) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(err) => {
                    error!("could not encode outbound message: {}", err);
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let session = Session::new(state, identity, tx);
    session.start().await;

    while let Some(Ok(frame)) = stream.next().await {
        match frame {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(message) => session.handle(message).await,
                Err(err) => session.reject(format!("malformed message: {}", err)),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    info!("client disconnected");
    session.close();
    drop(session);
    let _ = writer.await;
}
