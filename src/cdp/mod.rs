//! CDP (Chrome DevTools Protocol) layer
//!
//! WebSocket JSON-RPC transport to a Chromium target plus a typed client
//! for the handful of domains the extraction pipeline needs.

pub mod types;
pub mod traits;
pub mod connection;
pub mod client;
pub mod mock;

pub use client::CdpClientImpl;
pub use connection::CdpWebSocketConnection;
pub use traits::{CdpClient, CdpConnection, EvaluationResult, NavigationResult};
