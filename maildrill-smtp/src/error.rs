//! Error types for the simulation engine.
//!
//! Recipient validation failure is the only session-fatal condition; transient
//! packet loss is handled entirely inside the channel and never surfaces as an
//! error.

use maildrill_common::address::AddressError;
use thiserror::Error;

/// Errors that abort a protocol session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The recipient address failed the syntactic check.
    #[error("invalid recipient address {address:?}: {source}")]
    InvalidRecipient {
        address: String,
        #[source]
        source: AddressError,
    },

    /// The recipient address carries the invalid-marker substring.
    #[error("recipient address {address:?} is marked invalid")]
    MarkedInvalid { address: String },
}

impl SessionError {
    /// The offending recipient address.
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::InvalidRecipient { address, .. } | Self::MarkedInvalid { address } => address,
        }
    }
}
