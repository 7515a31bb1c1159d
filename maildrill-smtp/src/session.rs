//! One scripted protocol session, from HELO to QUIT.

use std::{sync::Arc, time::Duration};

use maildrill_common::{
    address::Address,
    config::MessageConfig,
    observer::{LogCategory, Node},
};
use maildrill_spool::{QueuedMessage, QueuedMessageId, message::CompletionNotifier};

use crate::{
    engine::{EngineInner, RunningGuard},
    error::SessionError,
    step::Step,
};

/// Fixed pause simulating the relay's liveness probe of the recipient.
pub const PROBE_INTERVAL: Duration = Duration::from_millis(800);

/// Recipient addresses containing this substring are always rejected.
pub const INVALID_MARKER: &str = "invalid";

/// Longest body prefix shown in the content-transfer log line.
const BODY_PREVIEW_CHARS: usize = 50;

/// Terminal state of one session run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The recipient was available and the message reached its mailbox.
    Delivered,
    /// The recipient was unavailable; the message is held in the queue.
    Queued(QueuedMessageId),
    /// Recipient validation failed; nothing was enqueued or delivered.
    Rejected(SessionError),
    /// Another session holds the running lock while the recipient is
    /// available; this submission was a no-op.
    AlreadyRunning,
}

pub(crate) struct Session {
    inner: Arc<EngineInner>,
    config: MessageConfig,
    notifier: Option<CompletionNotifier>,
}

impl Session {
    pub(crate) fn new(
        inner: Arc<EngineInner>,
        config: MessageConfig,
        notifier: Option<CompletionNotifier>,
    ) -> Self {
        Self {
            inner,
            config,
            notifier,
        }
    }

    /// Drive the six-step script to a terminal outcome.
    ///
    /// `guard` releases the engine's running flag when this function returns
    /// on any path, including the validation-failure fast path. It is `None`
    /// for overlapping submissions made while the recipient is unavailable;
    /// those must not reset the counters under the in-flight session.
    pub(crate) async fn run(mut self, guard: Option<RunningGuard>) -> SessionOutcome {
        let inner = Arc::clone(&self.inner);

        if guard.is_some() {
            inner.counters.reset();
        }
        inner.report_stats();
        inner.observer.on_log(
            &format!("Starting transmission to {}", self.config.recipient),
            LogCategory::Info,
        );

        let mut outcome = SessionOutcome::Delivered;

        for step in Step::SCRIPT {
            match step {
                Step::ProbeRecipient => {
                    outcome = self.probe_recipient().await;
                }
                Step::DeclareRecipient => {
                    if let Err(error) = self.declare_recipient().await {
                        inner.observer.on_log(
                            &format!("550 {error}; transmission aborted"),
                            LogCategory::Error,
                        );
                        inner.observer.on_node_active(None);
                        return SessionOutcome::Rejected(error);
                    }
                }
                _ => self.run_command_step(step).await,
            }
        }

        inner.observer.on_node_active(None);
        match &outcome {
            SessionOutcome::Delivered => inner.observer.on_log(
                &format!("Transmission to {} completed successfully", self.config.recipient),
                LogCategory::Success,
            ),
            SessionOutcome::Queued(id) => inner.observer.on_log(
                &format!("Message {id} queued; it will be delivered when the recipient comes online"),
                LogCategory::Info,
            ),
            SessionOutcome::Rejected(_) | SessionOutcome::AlreadyRunning => {}
        }

        outcome
    }

    /// Put one scripted command on the wire and absorb its acknowledgement.
    async fn run_command_step(&self, step: Step) {
        let inner = &self.inner;
        inner.observer.on_node_active(Some(Node::Client));

        if let Some(command) = step.command(&self.config) {
            inner.observer.on_log(&command, LogCategory::Command);
            if let Some(expected) = step.response() {
                let ack = inner
                    .channel
                    .transmit(
                        &command,
                        expected,
                        self.config.network_delay(),
                        self.config.loss_percent,
                    )
                    .await;
                inner.observer.on_node_active(Some(Node::Relay));
                inner.observer.on_log(&ack, LogCategory::Response);
            }
        }

        if step == Step::TransferContent {
            self.log_content();
        }

        inner.clock.sleep(self.config.server_delay()).await;
        inner.observer.on_progress(step.progress(), step.label());
    }

    /// The RCPT TO step: validate, then transmit like any other command.
    async fn declare_recipient(&self) -> Result<(), SessionError> {
        let recipient = &self.config.recipient;

        if recipient.contains(INVALID_MARKER) {
            return Err(SessionError::MarkedInvalid {
                address: recipient.clone(),
            });
        }
        Address::parse(recipient).map_err(|source| SessionError::InvalidRecipient {
            address: recipient.clone(),
            source,
        })?;

        self.run_command_step(Step::DeclareRecipient).await;
        Ok(())
    }

    /// The availability checkpoint: pause for the probe, then either forward
    /// to the mailbox or hand the message to the queue.
    async fn probe_recipient(&mut self) -> SessionOutcome {
        let inner = Arc::clone(&self.inner);
        let step = Step::ProbeRecipient;

        inner.observer.on_node_active(Some(Node::Relay));
        inner
            .observer
            .on_log("Checking recipient availability", LogCategory::Info);
        inner.clock.sleep(PROBE_INTERVAL).await;

        let outcome = if inner.availability.is_available() {
            inner.observer.on_node_active(Some(Node::Recipient));
            let ack = inner
                .channel
                .transmit(
                    "FORWARD message",
                    "250 Delivered to mailbox",
                    self.config.network_delay(),
                    self.config.loss_percent,
                )
                .await;
            inner.observer.on_log(&ack, LogCategory::Response);
            inner.observer.on_log(
                &format!("Message delivered to {}'s mailbox", self.config.recipient),
                LogCategory::Success,
            );
            SessionOutcome::Delivered
        } else {
            let message = match self.notifier.take() {
                Some(notifier) => QueuedMessage::with_notifier(
                    self.config.clone(),
                    inner.clock.now(),
                    notifier,
                ),
                None => QueuedMessage::new(self.config.clone(), inner.clock.now()),
            };
            let id = message.id();
            inner.observer.on_log(
                &format!("Recipient unavailable; storing message {id} for later delivery"),
                LogCategory::Warning,
            );
            inner.queue.enqueue(message);
            inner.report_stats();
            SessionOutcome::Queued(id)
        };

        inner.clock.sleep(self.config.server_delay()).await;
        inner.observer.on_progress(step.progress(), step.label());
        outcome
    }

    /// Info lines describing the transferred content, including a truncated
    /// body preview. Presentation only, never the delivered content.
    fn log_content(&self) {
        let observer = &self.inner.observer;
        observer.on_log(&format!("Subject: {}", self.config.subject), LogCategory::Info);
        observer.on_log(&format!("From: {}", self.config.sender), LogCategory::Info);
        observer.on_log(&format!("To: {}", self.config.recipient), LogCategory::Info);
        if let Some(attachment) = &self.config.attachment {
            observer.on_log(&format!("Attachment: {attachment}"), LogCategory::Info);
        }
        observer.on_log(
            &format!("Body: {}", body_preview(&self.config.body)),
            LogCategory::Info,
        );
    }
}

/// First [`BODY_PREVIEW_CHARS`] characters of the body, with an ellipsis when
/// truncated. Char-boundary safe.
fn body_preview(body: &str) -> String {
    if body.chars().count() <= BODY_PREVIEW_CHARS {
        body.to_string()
    } else {
        let mut preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        preview.push_str("...");
        preview
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn short_bodies_are_not_truncated() {
        assert_eq!(body_preview("hello"), "hello");
    }

    #[test]
    fn long_bodies_get_an_ellipsis() {
        let body = "x".repeat(60);
        let preview = body_preview(&body);
        assert_eq!(preview.chars().count(), BODY_PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(60);
        let preview = body_preview(&body);
        assert!(preview.starts_with(&"é".repeat(BODY_PREVIEW_CHARS)));
        assert!(preview.ends_with("..."));
    }
}
