//! Plain-text transmission report.
//!
//! An external consumer of the engine's public state: it renders a finished
//! session's config, outcome, final counters, and accumulated log into a
//! human-readable summary. Nothing in the engine depends on it.

use std::fmt::{self, Display, Write as _};

use maildrill_common::{
    config::MessageConfig,
    observer::{LogCategory, StatsSnapshot},
};
use maildrill_smtp::SessionOutcome;

/// A renderable summary of one completed (or queued, or rejected) session.
#[derive(Debug, Clone)]
pub struct TransmissionReport {
    config: MessageConfig,
    outcome: SessionOutcome,
    stats: StatsSnapshot,
    log: Vec<(String, LogCategory)>,
}

impl TransmissionReport {
    #[must_use]
    pub fn new(
        config: MessageConfig,
        outcome: SessionOutcome,
        stats: StatsSnapshot,
        log: Vec<(String, LogCategory)>,
    ) -> Self {
        Self {
            config,
            outcome,
            stats,
            log,
        }
    }

    /// Render the report.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        // String formatting is infallible.
        let _ = writeln!(out, "=== Transmission Report ===");
        let _ = writeln!(out);
        let _ = writeln!(out, "From:       {}", self.config.sender);
        let _ = writeln!(out, "To:         {}", self.config.recipient);
        let _ = writeln!(out, "Subject:    {}", self.config.subject);
        let _ = writeln!(
            out,
            "Attachment: {}",
            self.config.attachment.as_deref().unwrap_or("none")
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Outcome:    {}", outcome_line(&self.outcome));
        let _ = writeln!(out);
        let _ = writeln!(out, "Transport statistics");
        let _ = writeln!(out, "  Packets sent:    {}", self.stats.total_packets);
        let _ = writeln!(out, "  Packets lost:    {}", self.stats.lost_packets);
        let _ = writeln!(out, "  Retransmissions: {}", self.stats.retransmissions);
        let _ = writeln!(out, "  Still queued:    {}", self.stats.queue_length);

        if !self.log.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Session log");
            for (message, category) in &self.log {
                let _ = writeln!(out, "  [{category:>8}] {message}");
            }
        }

        out
    }
}

impl Display for TransmissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn outcome_line(outcome: &SessionOutcome) -> String {
    match outcome {
        SessionOutcome::Delivered => "delivered to recipient mailbox".to_string(),
        SessionOutcome::Queued(id) => {
            format!("queued for later delivery (message {id})")
        }
        SessionOutcome::Rejected(error) => format!("rejected: {error}"),
        SessionOutcome::AlreadyRunning => {
            "not started: another transmission was in progress".to_string()
        }
    }
}
