//! The scripted protocol exchange.
//!
//! A session is a linear walk over six steps. Four of them put an SMTP-style
//! command on the wire; the availability probe and the close bookend behave
//! differently (the probe sends nothing, the close sends QUIT).

use maildrill_common::config::MessageConfig;

/// One phase of the scripted client/relay exchange, in script order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Client introduces itself (HELO).
    Connect,
    /// Envelope sender declaration (MAIL FROM).
    DeclareSender,
    /// Envelope recipient declaration (RCPT TO); address validation happens here.
    DeclareRecipient,
    /// Message content transfer (DATA).
    TransferContent,
    /// Relay probes whether the recipient is reachable; no command on the wire.
    ProbeRecipient,
    /// Connection teardown (QUIT).
    Close,
}

impl Step {
    /// The full script, in execution order.
    pub const SCRIPT: [Self; 6] = [
        Self::Connect,
        Self::DeclareSender,
        Self::DeclareRecipient,
        Self::TransferContent,
        Self::ProbeRecipient,
        Self::Close,
    ];

    /// Zero-based position in the script.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Connect => 0,
            Self::DeclareSender => 1,
            Self::DeclareRecipient => 2,
            Self::TransferContent => 3,
            Self::ProbeRecipient => 4,
            Self::Close => 5,
        }
    }

    /// Progress after this step completes, in percent of the whole script.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn progress(self) -> u8 {
        (((self.index() + 1) * 100) / Self::SCRIPT.len()) as u8
    }

    /// Human-readable status label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Connect => "Connecting to relay",
            Self::DeclareSender => "Declaring sender",
            Self::DeclareRecipient => "Declaring recipient",
            Self::TransferContent => "Transferring content",
            Self::ProbeRecipient => "Probing recipient availability",
            Self::Close => "Closing connection",
        }
    }

    /// The command the client puts on the wire for this step, if any.
    #[must_use]
    pub fn command(self, config: &MessageConfig) -> Option<String> {
        match self {
            Self::Connect => Some("HELO client.example.com".to_string()),
            Self::DeclareSender => Some(format!("MAIL FROM:<{}>", config.sender)),
            Self::DeclareRecipient => Some(format!("RCPT TO:<{}>", config.recipient)),
            Self::TransferContent => Some("DATA".to_string()),
            Self::ProbeRecipient => None,
            Self::Close => Some("QUIT".to_string()),
        }
    }

    /// The relay's scripted acknowledgement for this step, if any.
    #[must_use]
    pub const fn response(self) -> Option<&'static str> {
        match self {
            Self::Connect => Some("250 relay.example.com Hello client.example.com"),
            Self::DeclareSender => Some("250 Sender OK"),
            Self::DeclareRecipient => Some("250 Recipient OK"),
            Self::TransferContent => Some("250 Message accepted for delivery"),
            Self::ProbeRecipient => None,
            Self::Close => Some("221 relay.example.com Service closing transmission channel"),
        }
    }
}
