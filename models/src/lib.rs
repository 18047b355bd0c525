//! Wire and domain models for the inspector console.
//!
//! This crate contains the data structures exchanged with the inspection
//! backend. Models carry no connection logic; they're validated data that
//! client-core moves over the socket.
//!
//! ## Contents
//!
//! - [`ClientMessage`] - outbound envelope, built through [`ClientMessageBuilder`]
//! - [`ServerFrame`] - the single decoded form of both inbound envelope shapes
//! - [`ServerAction`] - actions the backend acknowledges
//! - [`ConfigType`], [`Notice`], [`TaskStatus`] - typed payloads
//! - [`mask_sensitive`] - log-safe copies of config payloads

pub mod config_type;
pub mod envelope;
pub mod error;
pub mod masking;
pub mod notice;
pub mod server_action;
pub mod task;

pub use config_type::ConfigType;
pub use envelope::client_message::{ClientMessage, ClientMessageBuilder};
pub use envelope::server_frame::ServerFrame;
pub use error::model_error::ModelError;
pub use masking::{MASK, SENSITIVE_FIELDS, mask_sensitive};
pub use notice::{Notice, NoticeConfirmStatus, NoticeQuery};
pub use server_action::ServerAction;
pub use task::TaskStatus;

#[cfg(test)]
mod tests;
