pub mod auth;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod requests;
pub mod router;

#[cfg(test)]
mod tests;

pub use client::ConsoleClient;
pub use connection::ConnectionState;
pub use router::{Discriminator, MessageRouter, Subscription, SubscriptionId};

pub const DEFAULT_SERVER_HOSTNAME: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 8899;
pub const DEFAULT_WS_URL: &str =
    const_format::concatcp!("ws://", DEFAULT_SERVER_HOSTNAME, ":", DEFAULT_SERVER_PORT);
