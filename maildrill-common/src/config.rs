//! Message configuration for a simulated transmission.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_sender() -> String {
    "sender@example.com".to_string()
}

fn default_recipient() -> String {
    "recipient@example.com".to_string()
}

fn default_subject() -> String {
    "Test Email".to_string()
}

fn default_body() -> String {
    "This is a test message.".to_string()
}

const fn default_server_delay_secs() -> u64 {
    1
}

const fn default_network_delay_ms() -> u64 {
    500
}

const fn default_loss_percent() -> f64 {
    10.0
}

/// The full description of one message submission: envelope, content, and the
/// transport parameters the simulation runs with.
///
/// Immutable once a session starts; sessions and the queue work on snapshots.
/// Addresses are carried as raw strings here; syntactic validation happens at
/// the recipient-declaration step of a session, not at construction. The loss
/// percent is clamped to `[0, 100]` at the channel boundary, so out-of-range
/// values are accepted but harmless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageConfig {
    /// Envelope sender address.
    #[serde(default = "default_sender")]
    pub sender: String,

    /// Envelope recipient address.
    #[serde(default = "default_recipient")]
    pub recipient: String,

    /// Message subject line.
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Message body.
    #[serde(default = "default_body")]
    pub body: String,

    /// Optional attachment reference (a filename; never read from disk).
    #[serde(default)]
    pub attachment: Option<String>,

    /// Simulated relay processing delay applied after each response, in seconds.
    #[serde(default = "default_server_delay_secs")]
    pub server_delay_secs: u64,

    /// Simulated one-way network delay per transmission, in milliseconds.
    #[serde(default = "default_network_delay_ms")]
    pub network_delay_ms: u64,

    /// Base packet-loss probability in percent.
    #[serde(default = "default_loss_percent")]
    pub loss_percent: f64,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            sender: default_sender(),
            recipient: default_recipient(),
            subject: default_subject(),
            body: default_body(),
            attachment: None,
            server_delay_secs: default_server_delay_secs(),
            network_delay_ms: default_network_delay_ms(),
            loss_percent: default_loss_percent(),
        }
    }
}

impl MessageConfig {
    /// Start building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> MessageConfigBuilder {
        MessageConfigBuilder::default()
    }

    /// The relay processing delay as a [`Duration`].
    #[must_use]
    pub const fn server_delay(&self) -> Duration {
        Duration::from_secs(self.server_delay_secs)
    }

    /// The network delay as a [`Duration`].
    #[must_use]
    pub const fn network_delay(&self) -> Duration {
        Duration::from_millis(self.network_delay_ms)
    }
}

/// Builder for [`MessageConfig`], starting from the documented defaults.
#[derive(Debug, Clone, Default)]
pub struct MessageConfigBuilder {
    config: MessageConfig,
}

impl MessageConfigBuilder {
    #[must_use]
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.config.sender = sender.into();
        self
    }

    #[must_use]
    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.config.recipient = recipient.into();
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.config.subject = subject.into();
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.config.body = body.into();
        self
    }

    #[must_use]
    pub fn attachment(mut self, attachment: impl Into<String>) -> Self {
        self.config.attachment = Some(attachment.into());
        self
    }

    #[must_use]
    pub fn server_delay_secs(mut self, secs: u64) -> Self {
        self.config.server_delay_secs = secs;
        self
    }

    #[must_use]
    pub fn network_delay_ms(mut self, ms: u64) -> Self {
        self.config.network_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn loss_percent(mut self, percent: f64) -> Self {
        self.config.loss_percent = percent;
        self
    }

    #[must_use]
    pub fn build(self) -> MessageConfig {
        self.config
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MessageConfig::default();
        assert_eq!(config.sender, "sender@example.com");
        assert_eq!(config.recipient, "recipient@example.com");
        assert_eq!(config.subject, "Test Email");
        assert_eq!(config.body, "This is a test message.");
        assert_eq!(config.attachment, None);
        assert_eq!(config.server_delay(), Duration::from_secs(1));
        assert_eq!(config.network_delay(), Duration::from_millis(500));
        assert!((config.loss_percent - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: MessageConfig =
            ron::from_str("(recipient: \"alice@example.org\")").expect("valid RON");
        assert_eq!(config.recipient, "alice@example.org");
        assert_eq!(config.sender, "sender@example.com");
        assert_eq!(config.network_delay_ms, 500);
    }

    #[test]
    fn builder_overrides_selected_fields() {
        let config = MessageConfig::builder()
            .recipient("bob@example.net")
            .attachment("report.pdf")
            .loss_percent(0.0)
            .network_delay_ms(0)
            .server_delay_secs(0)
            .build();
        assert_eq!(config.recipient, "bob@example.net");
        assert_eq!(config.attachment.as_deref(), Some("report.pdf"));
        assert_eq!(config.subject, "Test Email");
        assert!((config.loss_percent).abs() < f64::EPSILON);
    }
}
