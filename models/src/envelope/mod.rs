//! Outbound and inbound JSON envelopes.
//!
//! Every frame on the wire is a single JSON object. Requests carry an
//! `action` plus operation-specific fields; responses and pushes arrive in one
//! of two shapes (`{action, config_type, success, message, config_data}` or
//! the legacy `{type, data}`), both decoded into [`ServerFrame`](server_frame::ServerFrame).

pub mod client_message;
pub mod server_frame;
