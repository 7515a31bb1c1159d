//! The maildrill simulation engine.
//!
//! Drives a scripted SMTP-style exchange between a client, a relay, and a
//! recipient over an unreliable in-process "network": each protocol step is a
//! simulated packet transmission that may be lost and retransmitted, and a
//! recipient that is offline at delivery time causes the message to be held
//! in a store-and-forward queue until availability flips back on.
//!
//! Nothing here touches sockets, files, or processes; every observable effect
//! goes through the injected [`Observer`](maildrill_common::observer::Observer)
//! and every delay through the injected [`Clock`](maildrill_common::clock::Clock).

pub mod availability;
pub mod channel;
pub mod counters;
pub mod engine;
pub mod error;
pub mod sampler;
pub mod session;
pub mod step;

pub use availability::Availability;
pub use channel::UnreliableChannel;
pub use engine::{Engine, EngineBuilder};
pub use error::SessionError;
pub use sampler::{LossSampler, SequenceSampler, ThreadRngSampler};
pub use session::SessionOutcome;
pub use step::Step;
