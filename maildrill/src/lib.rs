//! maildrill, an instructional store-and-forward mail-session simulator.
//!
//! The engine lives in [`maildrill_smtp`]; this crate re-exports the public
//! surface, adds the plain-text transmission report, and hosts the `maildrill`
//! CLI binary.

pub mod report;
pub mod scenario;

pub use maildrill_common::{
    address::{Address, AddressError},
    clock::{Clock, VirtualClock, WallClock},
    config::{MessageConfig, MessageConfigBuilder},
    logging,
    observer::{
        LogCategory, Node, NullObserver, Observer, ObserverEvent, RecordingObserver,
        StatsSnapshot, TracingObserver,
    },
};
pub use maildrill_smtp::{
    Engine, EngineBuilder, LossSampler, SequenceSampler, SessionError, SessionOutcome,
    ThreadRngSampler,
};
pub use maildrill_spool::{MailQueue, QueuedMessage, QueuedMessageId};
pub use report::TransmissionReport;
pub use scenario::Scenario;
