//! CLI driver for the maildrill simulator.
//!
//! Rendering lives here, not in the engine: the console observer below is one
//! implementation of the observer boundary, printing the event stream while a
//! recording observer accumulates it for the final report.

use std::path::PathBuf;

use clap::Parser;
use maildrill::{
    Engine, LogCategory, MessageConfig, Node, Observer, RecordingObserver, Scenario,
    StatsSnapshot, TransmissionReport, logging,
};

/// Simulate an SMTP-style transmission over an unreliable transport.
#[derive(Parser, Debug)]
#[command(name = "maildrill")]
#[command(about = "Simulate a store-and-forward mail transmission", long_about = None)]
#[command(version)]
struct Cli {
    /// Envelope sender address.
    #[arg(long, default_value = "sender@example.com")]
    sender: String,

    /// Envelope recipient address.
    #[arg(long, default_value = "recipient@example.com")]
    recipient: String,

    /// Message subject.
    #[arg(long, default_value = "Test Email")]
    subject: String,

    /// Message body.
    #[arg(long, default_value = "This is a test message.")]
    body: String,

    /// Attachment reference to carry along (a name; nothing is read).
    #[arg(long)]
    attachment: Option<String>,

    /// Relay processing delay per step, in seconds.
    #[arg(long, default_value_t = 1)]
    server_delay: u64,

    /// Network delay per transmission, in milliseconds.
    #[arg(long, default_value_t = 500)]
    network_delay: u64,

    /// Base packet-loss probability, in percent.
    #[arg(long, default_value_t = 10.0)]
    loss: f64,

    /// Start with the recipient offline, then toggle availability afterwards
    /// to demonstrate the queue flush.
    #[arg(long)]
    offline: bool,

    /// Load the message and offline flag from a RON scenario file instead of
    /// the flags above.
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,
}

impl Cli {
    fn into_scenario(self) -> anyhow::Result<Scenario> {
        if let Some(path) = self.scenario {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                anyhow::anyhow!("Failed to read scenario from {}: {}", path.display(), e)
            })?;
            return Ok(Scenario::from_ron(&text)?);
        }

        Ok(Scenario {
            message: MessageConfig {
                sender: self.sender,
                recipient: self.recipient,
                subject: self.subject,
                body: self.body,
                attachment: self.attachment,
                server_delay_secs: self.server_delay,
                network_delay_ms: self.network_delay,
                loss_percent: self.loss,
            },
            offline: self.offline,
        })
    }
}

/// Prints events as they happen and forwards them to a recorder for the
/// final report.
#[derive(Debug, Clone)]
struct ConsoleObserver {
    recorder: RecordingObserver,
}

impl Observer for ConsoleObserver {
    fn on_log(&self, message: &str, category: LogCategory) {
        println!("[{category:>8}] {message}");
        self.recorder.on_log(message, category);
    }

    fn on_progress(&self, percent: u8, status: &str) {
        println!("[progress] {percent:>3}% {status}");
        self.recorder.on_progress(percent, status);
    }

    fn on_node_active(&self, node: Option<Node>) {
        if let Some(node) = node {
            println!("[  active] {node}");
        }
        self.recorder.on_node_active(node);
    }

    fn on_stats(&self, stats: StatsSnapshot) {
        self.recorder.on_stats(stats);
    }

    fn on_availability_changed(&self, is_available: bool) {
        let state = if is_available { "online" } else { "offline" };
        println!("[  status] recipient is now {state}");
        self.recorder.on_availability_changed(is_available);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let scenario = Cli::parse().into_scenario()?;
    tracing::debug!(?scenario, "scenario loaded");

    let recorder = RecordingObserver::new();
    let engine = Engine::builder()
        .observer(ConsoleObserver {
            recorder: recorder.clone(),
        })
        .initially_available(!scenario.offline)
        .build();

    let config = scenario.message.clone();
    let outcome = engine.submit(config.clone()).await;

    if scenario.offline {
        // Bring the recipient back so the queued message gets flushed.
        engine.toggle_availability().await;
    }

    let report = TransmissionReport::new(config, outcome, engine.stats(), recorder.logs());
    println!();
    print!("{report}");

    Ok(())
}
