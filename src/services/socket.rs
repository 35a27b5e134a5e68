use crate::AppState;
use axum::{routing::get, Router};

pub mod model;
pub mod session;
pub mod ws_handler;

pub use model::{ClientMessage, MethodFailure, ServerMessage};
pub use session::Session;

/**
 * socket routes
 * one endpoint carries every subscription and method call of a client
 */
pub fn router() -> Router<AppState> {
    Router::new().route("/websocket", get(ws_handler::ws_handler))
}
