//! Socket lifecycle.
//!
//! One task owns the WebSocket, the outbound queue, the reconnect timer and
//! the retained credentials. Every public operation on
//! [`ConsoleClient`](crate::ConsoleClient) is a command sent to that task, so
//! state changes are applied strictly in submission order.

pub(crate) mod actor;
pub mod backoff;
pub mod state;

pub use backoff::TableBackoff;
pub use state::ConnectionState;
