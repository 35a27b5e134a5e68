//! In-process client for the publication engine.
//!
//! Mirrors what a browser client does over the websocket: subscribe to named
//! publications, keep a local cache of what they deliver, gate page rendering
//! on every subscription being ready, and call remote methods.

pub mod cache;
pub mod connection;
pub mod gate;
pub mod pages;

pub use cache::LocalCache;
pub use connection::{LocalConnection, SubscriptionHandle, SubscriptionStatus};
pub use gate::{GateError, GateState, SubscriptionGate};
