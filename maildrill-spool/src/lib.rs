//! Store-and-forward queue for messages whose recipient was unavailable.

pub mod message;
pub mod queue;
pub mod types;

pub use message::QueuedMessage;
pub use queue::MailQueue;
pub use types::QueuedMessageId;
