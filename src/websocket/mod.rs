//! Real-time client for the employer event stream.
//!
//! The backend pushes SmartBot interview progress and analysis results to
//! employers over a WebSocket. This module owns that connection through a
//! single type, [`ConnectionManager`], which authenticates the stream from
//! a shared [`TokenStore`](crate::auth::TokenStore), surfaces lifecycle
//! and message events through swappable callbacks, and transparently
//! recovers from unexpected drops.
//!
//! # Endpoint
//!
//! `ws(s)://<host>/ws/employer[/session/<sessionId> | /job/<jobId>]?token=<jwt>`
//!
//! Exactly one of the two path suffixes is used; a configured session id
//! takes precedence over a job id. The token travels as a query parameter
//! because the transport offers no custom headers.
//!
//! # Reconnection behavior
//!
//! - A close with code 1000 (normal closure, including our own
//!   [`ConnectionManager::disconnect`]) never triggers a reconnect.
//! - Any other close schedules a single retry after
//!   `min(1000 * 2^attempt, 30000)` milliseconds, up to 5 attempts by
//!   default. The attempt counter resets to zero on every successful
//!   open, so a long-lived connection that drops later starts backoff
//!   from the first step again.
//! - A failed handshake sets the status to `error`, fires the error
//!   callback, and then takes the same abnormal-close path, so a down
//!   endpoint is retried with backoff until attempts run out.
//! - `disconnect()` cancels a pending retry before doing anything else,
//!   so a manual disconnect always wins over a scheduled reconnect.
//!
//! # Usage
//!
//! ```no_run
//! use jobboard_connector_rs::auth::TokenStore;
//! use jobboard_connector_rs::websocket::{ConnectionConfig, ConnectionManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tokens = TokenStore::with_token("jwt-from-login");
//!     let config = ConnectionConfig::new("ws://localhost:8000").with_session("sess-9");
//!     let manager = ConnectionManager::new(config, tokens);
//!
//!     manager.set_on_message(|msg| println!("event {}: {}", msg.kind, msg.data));
//!     manager.set_on_disconnect(|| println!("stream closed"));
//!
//!     manager.connect().await;
//!     manager
//!         .send(&serde_json::json!({"type": "subscribe", "data": null}))
//!         .await
//!         .expect("serialization failed");
//!
//!     tokio::signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
//!     manager.disconnect().await;
//! }
//! ```
//!
//! Callbacks should be quick and must not panic; they run on the
//! connection's reader task.

pub mod client;

pub use client::{ConnectionConfig, ConnectionManager, ConnectionStatus, WsMessage};
