//! RON scenario files for the CLI driver.

use maildrill_common::config::MessageConfig;
use serde::Deserialize;

/// A scripted run: the message to submit and whether the recipient starts
/// offline (in which case the driver toggles availability afterwards to
/// demonstrate the queue flush).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    /// The message to transmit; omitted fields take the documented defaults.
    #[serde(default)]
    pub message: MessageConfig,

    /// Start with the recipient unavailable.
    #[serde(default)]
    pub offline: bool,
}

impl Scenario {
    /// Parse a scenario from RON text.
    ///
    /// # Errors
    /// If the text is not valid RON for this shape.
    pub fn from_ron(text: &str) -> Result<Self, ron::Error> {
        ron::from_str(text).map_err(Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_full_scenario() {
        let scenario = Scenario::from_ron(
            r#"(
                message: (
                    recipient: "alice@example.org",
                    subject: "Queued greetings",
                    loss_percent: 25.0,
                ),
                offline: true,
            )"#,
        )
        .expect("valid scenario");

        assert!(scenario.offline);
        assert_eq!(scenario.message.recipient, "alice@example.org");
        assert_eq!(scenario.message.subject, "Queued greetings");
        // Unspecified fields fall back to the defaults.
        assert_eq!(scenario.message.sender, "sender@example.com");
    }

    #[test]
    fn empty_scenario_is_all_defaults() {
        let scenario = Scenario::from_ron("()").expect("valid scenario");
        assert!(!scenario.offline);
        assert_eq!(scenario.message, MessageConfig::default());
    }

    #[test]
    fn rejects_malformed_ron() {
        assert!(Scenario::from_ron("(message: oops)").is_err());
    }
}
