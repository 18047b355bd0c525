//! Shared building blocks for the inspector console.
//!
//! This crate holds the small pieces every other crate leans on:
//!
//! - [`ErrorLocation`] - `file:line:column` capture for error variants
//! - [`RedactedSecret`] - password holder that never prints or serializes its value
//!
//! ## Architecture
//!
//! - **common** (this crate): error plumbing and secret handling
//! - **models**: wire envelopes and domain payloads
//! - **client-core**: the real-time transport client
//! - **inspector-console**: operator CLI wiring everything together

pub mod error;
pub mod redacted_secret;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_secret::RedactedSecret;

#[cfg(test)]
mod tests;
