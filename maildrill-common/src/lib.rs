pub mod address;
pub mod clock;
pub mod config;
pub mod logging;
pub mod observer;

pub use tracing;
