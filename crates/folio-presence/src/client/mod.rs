//! Async presence client over `tokio-tungstenite`.
//!
//! [`PresenceClient`] is a cheap, cloneable handle; the socket, heartbeat
//! and reconnect timer live in a single background driver task that feeds
//! the [`PresenceMachine`](crate::machine::PresenceMachine).

mod driver;
mod handle;
mod types;

#[cfg(test)]
mod tests;

pub use handle::PresenceClient;
pub use types::PresenceClientConfig;
